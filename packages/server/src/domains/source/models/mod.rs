pub mod create;
pub mod detected_newsletter_form;
pub mod newsletter_source;
pub mod social_source;
pub mod source;
pub mod website_source;

pub use create::*;
pub use detected_newsletter_form::DetectedNewsletterForm;
pub use newsletter_source::NewsletterSource;
pub use social_source::SocialSource;
pub use source::*;
pub use website_source::WebsiteSource;
