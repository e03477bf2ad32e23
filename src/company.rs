//! Client companies, seen only through their active flag
use super::error::{ReviewError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

pub trait CompanyProvider: Send + Sync {
    /// `NotFound` when the id is unknown.
    fn is_active(&self, company_id: &str) -> Result<bool>;
}

/// In-process directory of companies and their active flag.
#[derive(Debug, Default)]
pub struct CompanyDirectory {
    companies: RwLock<HashMap<String, bool>>,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, company_id: &str, active: bool) -> Result<()> {
        let mut companies = self
            .companies
            .write()
            .map_err(|_| ReviewError::Persistence("company directory lock poisoned".into()))?;
        companies.insert(company_id.to_string(), active);
        Ok(())
    }

    pub fn set_active(&self, company_id: &str, active: bool) -> Result<()> {
        let mut companies = self
            .companies
            .write()
            .map_err(|_| ReviewError::Persistence("company directory lock poisoned".into()))?;

        match companies.get_mut(company_id) {
            Some(flag) => {
                *flag = active;
                Ok(())
            }
            None => Err(ReviewError::not_found("company", company_id)),
        }
    }
}

impl CompanyProvider for CompanyDirectory {
    fn is_active(&self, company_id: &str) -> Result<bool> {
        let companies = self
            .companies
            .read()
            .map_err(|_| ReviewError::Persistence("company directory lock poisoned".into()))?;

        companies
            .get(company_id)
            .copied()
            .ok_or_else(|| ReviewError::not_found("company", company_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_flag_and_unknown_ids() {
        let directory = CompanyDirectory::new();
        directory.register("company_a", true).unwrap();

        assert!(directory.is_active("company_a").unwrap());
        assert!(matches!(
            directory.is_active("company_b"),
            Err(ReviewError::NotFound(_))
        ));
    }

    #[test]
    fn deactivation_is_visible() {
        let directory = CompanyDirectory::new();
        directory.register("company_a", true).unwrap();
        directory.set_active("company_a", false).unwrap();

        assert!(!directory.is_active("company_a").unwrap());
        assert!(directory.set_active("company_x", true).is_err());
    }

    #[test]
    fn poisoned_directory_refuses_registration() {
        let directory = std::sync::Arc::new(CompanyDirectory::new());
        let poisoner = directory.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.companies.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(
            directory.register("company_a", true),
            Err(ReviewError::Persistence(_))
        ));
    }
}
