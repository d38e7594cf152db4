//! Database repositories.
//!
//! One repository per aggregate; each wraps the shared connection and
//! returns `AppResult`.

mod article;
mod author_profile;
mod badge;
mod category;
mod comment;
mod engagement;
mod follow;
mod notification;
mod report;
mod user;

pub use article::ArticleRepository;
pub use author_profile::AuthorProfileRepository;
pub use badge::BadgeRepository;
pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use engagement::EngagementRepository;
pub use follow::FollowRepository;
pub use notification::NotificationRepository;
pub use report::ReportRepository;
pub use user::UserRepository;
