//! Business logic services.

#![allow(missing_docs)]

pub mod article;
pub mod author;
pub mod badge;
pub mod category;
pub mod comment;
pub mod engagement;
pub mod notification;
pub mod report;
pub mod user;

pub use article::{ArticleService, CreateArticleInput, UpdateArticleInput};
pub use author::{ApplyForAuthorInput, AuthorService};
pub use badge::BadgeService;
pub use category::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{CommentService, CommentThread, CreateCommentInput};
pub use engagement::EngagementService;
pub use notification::{NotificationService, NotifyInput};
pub use report::{ReportEntry, ReportService, ReportedArticle, ReportedComment};
pub use user::{RegisterInput, UpdateProfileInput, UserService};
