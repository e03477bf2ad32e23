//! Smoke Screen Unit tests for creative review components
//!
//! These span the public API and check each component in isolation from the
//! service scenarios. They generally test the happy-path.

use creative_review::{
    comment::{CommentLog, Remark},
    company::{CompanyDirectory, CompanyProvider},
    config::ReviewConfig,
    creative::{Creative, CreativeStatus, CreativeType, NewCreative},
    ledger::VersionLedger,
    repository::{CreativeFilter, CreativeRepository, MemoryRepository},
    service::ReviewService,
    timestamp::TimeStamp,
    utils::new_uuid_to_bech32,
};
use std::sync::Arc;

// UTILS MODULE TESTS
mod utils_tests {
    use super::*;

    /// Identifiers carry the requested human-readable prefix
    #[test]
    fn generates_prefixed_ids() {
        let id = new_uuid_to_bech32("creative_").unwrap();
        assert!(id.starts_with("creative_1"));
        assert!(id.len() > 20);
    }

    /// Consecutive ids never repeat
    #[test]
    fn generates_unique_ids() {
        let ids: Vec<String> = (0..16)
            .map(|_| new_uuid_to_bech32("creative_").unwrap())
            .collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(ids.len(), deduped.len());
    }
}

// CREATIVE MODULE TESTS
mod creative_tests {
    use super::*;

    #[test]
    fn draft_parses_type_from_text() {
        let draft = NewCreative::parse("Carousel", "user_agency", "slide-0.png").unwrap();
        assert_eq!(draft.kind, CreativeType::Carousel);
        assert!(NewCreative::parse("hologram", "user_agency", "x.png").is_err());
    }

    #[test]
    fn draft_builder_sets_fields() {
        let draft = NewCreative::new(CreativeType::Story, "user_agency", "story.mp4")
            .set_title("Launch teaser")
            .set_caption("Coming soon")
            .set_company("company_acme");

        assert_eq!(draft.title.as_deref(), Some("Launch teaser"));
        assert_eq!(draft.caption.as_deref(), Some("Coming soon"));
        assert_eq!(draft.company_id.as_deref(), Some("company_acme"));
    }

    #[test]
    fn type_display_matches_wire_names() {
        let names: Vec<String> = CreativeType::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            ["post", "story", "carousel", "reels", "motion", "banner", "video", "other"]
        );
    }

    #[test]
    fn new_creatives_start_pending() {
        let companies = CompanyDirectory::new();
        let draft = NewCreative::new(CreativeType::Motion, "user_agency", "loop.mp4");
        let creative = Creative::create(draft, "asset://loop", &companies).unwrap();

        assert_eq!(creative.status(), CreativeStatus::default());
        assert_eq!(creative.revision(), 0);
        assert!(!creative.is_deleted());
    }

    #[test]
    fn blank_uploader_is_refused() {
        let companies = CompanyDirectory::new();
        let draft = NewCreative::new(CreativeType::Post, "  ", "a.png");
        assert!(Creative::create(draft, "asset://a", &companies).is_err());
    }
}

// LEDGER AND LOG TESTS
mod history_tests {
    use super::*;

    #[test]
    fn ledger_current_follows_appends() {
        let mut ledger = VersionLedger::seeded("asset://0", "v0.png").unwrap();
        for n in 1..=5 {
            ledger.append(&format!("asset://{n}"), "v.png").unwrap();
            assert_eq!(ledger.current().unwrap().sequence, n);
        }
        assert_eq!(ledger.first().unwrap().asset_ref, "asset://0");
    }

    #[test]
    fn comment_log_is_chronological() {
        let mut log = CommentLog::default();
        for text in ["first", "second", "third"] {
            log.append(&Remark::new("Ana", text)).unwrap();
        }

        let texts: Vec<&str> = log.all().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);

        let stamps: Vec<TimeStamp<chrono::Utc>> = log.all().map(|c| c.created_at.clone()).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn system_comments_have_no_author_id() {
        let mut log = CommentLog::default();
        let comment = log.append(&Remark::new("system", "Version 2 uploaded")).unwrap();
        assert!(comment.author_id.is_none());
    }
}

// REPOSITORY TESTS
mod repository_tests {
    use super::*;

    #[test]
    fn filters_by_company_and_type() {
        let companies = CompanyDirectory::new();
        companies.register("company_a", true).unwrap();
        companies.register("company_b", true).unwrap();
        let repo = MemoryRepository::new();

        for (company, kind) in [
            ("company_a", CreativeType::Post),
            ("company_a", CreativeType::Video),
            ("company_b", CreativeType::Post),
        ] {
            let draft = NewCreative::new(kind, "user_agency", "f.bin").set_company(company);
            let mut creative = Creative::create(draft, "asset://f", &companies).unwrap();
            repo.save(&mut creative).unwrap();
        }

        let a = repo.list(&CreativeFilter::new().set_company("company_a")).unwrap();
        let posts = repo.list(&CreativeFilter::new().set_kind(CreativeType::Post)).unwrap();
        let a_posts = repo
            .list(
                &CreativeFilter::new()
                    .set_company("company_a")
                    .set_kind(CreativeType::Post),
            )
            .unwrap();

        assert_eq!(a.len(), 2);
        assert_eq!(posts.len(), 2);
        assert_eq!(a_posts.len(), 1);
    }

    #[test]
    fn company_lookup_reports_unknown() {
        let companies = CompanyDirectory::new();
        assert!(companies.is_active("company_ghost").is_err());
    }
}

// SERVICE CONSTRUCTION TESTS
mod service_tests {
    use super::*;

    #[test]
    fn builds_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReviewConfig::new(dir.path().join("db"), dir.path().join("assets"));
        let companies = Arc::new(CompanyDirectory::new());

        let service = ReviewService::from_config(&config, companies).unwrap();
        let creative = service
            .upload_creative(
                NewCreative::new(CreativeType::Banner, "user_agency", "banner.png"),
                b"banner-bytes",
                "image/png",
            )
            .unwrap();

        assert!(creative.primary_asset_ref().starts_with("file://"));
        assert!(dir.path().join("assets").is_dir());
    }

    #[test]
    fn from_config_refuses_invalid_config() {
        let config = ReviewConfig::new("same", "same");
        assert!(ReviewService::from_config(&config, Arc::new(CompanyDirectory::new())).is_err());
    }
}
