//! Database entities.

pub mod article;
pub mod article_like;
pub mod article_report;
pub mod article_tag;
pub mod author_profile;
pub mod badge;
pub mod bookmark;
pub mod category;
pub mod comment;
pub mod comment_like;
pub mod comment_report;
pub mod follow;
pub mod notification;
pub mod reading_list_entry;
pub mod tag;
pub mod user;
pub mod user_badge;

pub use article::Entity as Article;
pub use article_like::Entity as ArticleLike;
pub use article_report::Entity as ArticleReport;
pub use article_tag::Entity as ArticleTag;
pub use author_profile::Entity as AuthorProfile;
pub use badge::Entity as Badge;
pub use bookmark::Entity as Bookmark;
pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use comment_like::Entity as CommentLike;
pub use comment_report::Entity as CommentReport;
pub use follow::Entity as Follow;
pub use notification::Entity as Notification;
pub use reading_list_entry::Entity as ReadingListEntry;
pub use tag::Entity as Tag;
pub use user::Entity as User;
pub use user_badge::Entity as UserBadge;
