//! The static question list.
//!
//! Order within a category is the order shown to the user; categories are
//! re-ordered by [`super::filter::CATEGORY_ORDER`].

use super::{Condition, Expected, Question, QuestionKind};
use crate::plans::PlanTier;

const YES_NO: &[&str] = &["yes", "no"];
const PAID_TIERS: &[PlanTier] = &[PlanTier::Business, PlanTier::Enterprise];
const ENTERPRISE_ONLY: &[PlanTier] = &[PlanTier::Enterprise];

const fn when(question_id: &'static str, value: &'static str) -> Option<Condition> {
    Some(Condition {
        question_id,
        expected: Expected::One(value),
    })
}

const fn when_any(question_id: &'static str, values: &'static [&'static str]) -> Option<Condition> {
    Some(Condition {
        question_id,
        expected: Expected::AnyOf(values),
    })
}

const fn q(
    id: &'static str,
    category: &'static str,
    kind: QuestionKind,
    label: &'static str,
    required: bool,
) -> Question {
    Question {
        id,
        category,
        kind,
        label,
        required,
        options: &[],
        condition: None,
        plans: None,
    }
}

const fn choice(
    id: &'static str,
    category: &'static str,
    kind: QuestionKind,
    label: &'static str,
    options: &'static [&'static str],
) -> Question {
    Question {
        id,
        category,
        kind,
        label,
        required: true,
        options,
        condition: None,
        plans: None,
    }
}

pub static QUESTIONS: &[Question] = &[
    // -- basics --
    q("businessName", "basics", QuestionKind::Text, "Business name", true),
    q("contactEmail", "basics", QuestionKind::Email, "Contact email", true),
    q("contactPhone", "basics", QuestionKind::Phone, "Contact phone", false),
    q("businessAddress", "basics", QuestionKind::Textarea, "Business address", false),
    // -- business type --
    choice(
        "businessType",
        "business_type",
        QuestionKind::Select,
        "What kind of business is this?",
        &[
            "restaurant",
            "retail",
            "professional_services",
            "health_wellness",
            "creative",
            "nonprofit",
            "other",
        ],
    ),
    Question {
        condition: when("businessType", "other"),
        ..q("businessTypeOther", "business_type", QuestionKind::Text, "Describe your business type", true)
    },
    // -- domain --
    choice("hasDomain", "domain", QuestionKind::Radio, "Do you already own a domain?", YES_NO),
    Question {
        condition: when("hasDomain", "yes"),
        ..q("existingDomain", "domain", QuestionKind::Domain, "Your domain", true)
    },
    Question {
        condition: when("hasDomain", "yes"),
        ..q("domainRegistrar", "domain", QuestionKind::Text, "Where is it registered?", false)
    },
    Question {
        condition: when("hasDomain", "no"),
        ..q("desiredDomain", "domain", QuestionKind::Domain, "Domain you would like", true)
    },
    // -- features (listed early on purpose; sorted later) --
    Question {
        condition: when_any("businessType", &["restaurant", "retail"]),
        ..choice("onlineOrdering", "features", QuestionKind::Radio, "Do you need online ordering?", YES_NO)
    },
    Question {
        condition: when("onlineOrdering", "yes"),
        plans: Some(PAID_TIERS),
        ..choice(
            "productCount",
            "features",
            QuestionKind::Select,
            "How many products will you sell?",
            &["1-10", "11-50", "51-200", "200+"],
        )
    },
    Question {
        plans: Some(ENTERPRISE_ONLY),
        required: false,
        ..choice(
            "integrations",
            "features",
            QuestionKind::MultiSelect,
            "Integrations you need",
            &["booking", "newsletter", "live_chat", "analytics", "payments", "crm"],
        )
    },
    Question {
        plans: Some(PAID_TIERS),
        ..q("seoKeywords", "features", QuestionKind::Textarea, "Search keywords to target", false)
    },
    // -- email --
    choice(
        "wantsProfessionalEmail",
        "email",
        QuestionKind::Radio,
        "Would you like professional email addresses?",
        YES_NO,
    ),
    Question {
        condition: when("wantsProfessionalEmail", "yes"),
        ..q(
            "professionalEmails",
            "email",
            QuestionKind::ProfessionalEmails,
            "Mailbox names (e.g. info, hello)",
            true,
        )
    },
    // -- branding --
    choice("hasLogo", "branding", QuestionKind::Radio, "Do you have a logo?", YES_NO),
    Question {
        condition: when("hasLogo", "yes"),
        ..q("logoUpload", "branding", QuestionKind::File, "Upload your logo", true)
    },
    q("brandColors", "branding", QuestionKind::Text, "Brand colors", false),
    choice(
        "stylePreferences",
        "branding",
        QuestionKind::MultiSelect,
        "Which styles do you like?",
        &["modern", "classic", "minimal", "bold", "playful", "elegant"],
    ),
    q("referenceWebsites", "branding", QuestionKind::Textarea, "Websites you like", false),
    // -- content --
    q("businessDescription", "content", QuestionKind::Textarea, "Describe your business", true),
    q("targetAudience", "content", QuestionKind::Textarea, "Who are your customers?", true),
    choice(
        "pagesNeeded",
        "content",
        QuestionKind::MultiSelect,
        "Which pages do you need?",
        &[
            "home",
            "about",
            "services",
            "contact",
            "blog",
            "gallery",
            "faq",
            "testimonials",
            "shop",
        ],
    ),
    Question {
        condition: when("pagesNeeded", "blog"),
        plans: Some(PAID_TIERS),
        ..q("blogTopics", "content", QuestionKind::Textarea, "Blog topics", false)
    },
    // -- services --
    q("services", "services", QuestionKind::Services, "Services or products you offer", true),
    // -- team --
    Question {
        plans: Some(PAID_TIERS),
        ..q("teamMembers", "team", QuestionKind::TeamMembers, "Team members to feature", false)
    },
    // -- social --
    q("socialLinks", "social", QuestionKind::SocialLinks, "Social media profiles", false),
    // -- media --
    Question {
        condition: when("businessType", "restaurant"),
        ..q("menuUpload", "media", QuestionKind::File, "Upload your menu", false)
    },
    Question {
        plans: Some(PAID_TIERS),
        ..q("photoGallery", "media", QuestionKind::MultiFile, "Photos for your gallery", false)
    },
    // -- additional info --
    q("launchDeadline", "additional_info", QuestionKind::Text, "Any launch deadline?", false),
    q("additionalNotes", "additional_info", QuestionKind::Textarea, "Anything else we should know?", false),
];
