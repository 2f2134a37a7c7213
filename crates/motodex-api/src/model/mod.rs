//! Wire models.

mod favorite;
mod filters;
mod motorcycle;
mod review;
mod stats;
mod user;

pub use favorite::{Favorite, FavoriteCheck};
pub use filters::{DEFAULT_PAGE_SIZE, MotorcycleFilters, Pagination, SortBy, SortOrder};
pub use motorcycle::{
    AvailableFilters, Engine, Image, Motorcycle, PaginationInfo, Performance, Power, Price, Range,
    Rating, Torque,
};
pub use review::{
    Helpful, NewReview, Ownership, Review, ReviewAuthor, ReviewPage, ReviewScores, ReviewUpdate,
};
pub use stats::{BrandCount, CategoryCount, FilePart, Stats, UploadedUrl, UploadedUrls};
pub use user::{
    AuthPayload, LoginCredentials, Preferences, Profile, ProfileUpdate, RefreshPayload,
    RegisterCredentials, Role, Units, User,
};
