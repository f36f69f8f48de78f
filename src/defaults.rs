//! Built-in site content.
//!
//! These values fill every field the remote table leaves blank, and are the
//! whole content when the table cannot be fetched.

use crate::models::{ListField, Record};

fn chapter(title: &str, vimeo_id: &str, thumbnail_url: &str) -> Record {
    Record::new()
        .with_text("title", title)
        .with_text("vimeoId", vimeo_id)
        .with_text("thumbnailUrl", thumbnail_url)
}

/// The default content record
pub fn default_site_record() -> Record {
    Record::with_lists()
        .with_text("siteTitle", "Brother Brother | The Showreel")
        .with_text("mainMenuTitle", "BROTHER BROTHER")
        .with_text("mainMenuGlitchText", "YAZ and HAZ")
        .with_text("mainMenuSubtitle", "THE SHOWREEL")
        .with_text("copyrightText", "© 2025 BROTHER BROTHER. ALL RIGHTS RESERVED.")
        .with_text("mainBackgroundVimeoId", "292109430")
        .with_text("mainReelVimeoId", "1105829365/0f8376e14b")
        .with_text(
            "specialFeaturesBackgroundImage",
            "https://images.squarespace-cdn.com/content/62c2b737a32928605d35b9dd/d56856ff-5d6d-4d98-acfe-1ed609ef3d75/RUTH+|+festival+preview-high1.gif",
        )
        .with_text("sceneBackgroundImage", "assets/MakeItCount-bucket.jpg")
        .with_entry(
            ListField::Chapters,
            chapter(
                "SUMUP - Make it Count",
                "1017849814",
                "assets/make-it-count-thumbnail.gif",
            ),
        )
        .with_entry(
            ListField::Chapters,
            chapter(
                "DATASNIPPERS - Sandcastles",
                "1105915041?h=7eb0001144",
                "assets/datasnipper-thumbnail.gif",
            ),
        )
        .with_entry(
            ListField::Chapters,
            chapter(
                "PVCASE - What Would You Do",
                "1106051275/2656e0296f",
                "assets/pvcase-thumbnail.gif",
            ),
        )
        .with_entry(
            ListField::Chapters,
            chapter(
                "SIEMENS - Smart Kitchen",
                "856359531",
                "assets/siemens-thumbnail.gif",
            ),
        )
        .with_entry(
            ListField::SpecialFeatures,
            Record::new()
                .with_text("text", "Make Contact")
                .with_text("type", "internal")
                .with_text("targetScreen", "contact"),
        )
        .with_entry(
            ListField::SpecialFeatures,
            Record::new().with_text("text", "About Us"),
        )
        .with_entry(
            ListField::SpecialFeatures,
            Record::new()
                .with_text("text", "Instagram")
                .with_text("url", "https://www.instagram.com/brobrofilm/")
                .with_text("target", "_blank"),
        )
        .with_entry(
            ListField::SpecialFeatures,
            Record::new()
                .with_text("text", "Easter Eggs")
                .with_text("url", "#"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lists_are_well_formed() {
        let defaults = default_site_record();
        assert_eq!(defaults.entries(ListField::Chapters).count(), 4);
        assert_eq!(defaults.entries(ListField::SpecialFeatures).count(), 4);
        assert!(defaults.list(ListField::Pagination).is_empty());

        for list in ListField::ALL {
            assert!(
                defaults
                    .entries(list)
                    .all(|entry| !entry.is_blank(list.defining_field()))
            );
        }
    }

    #[test]
    fn test_defaults_carry_no_identity() {
        let defaults = default_site_record();
        assert_eq!(defaults.row_id(), None);
        assert_eq!(defaults.based_on(), None);
        assert_eq!(defaults.text("mainMenuTitle"), Some("BROTHER BROTHER"));
    }
}
