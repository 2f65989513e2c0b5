pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod expenses;
pub mod family;
pub mod lists;
pub mod meals;
pub mod oauth;
pub mod recurrence;
pub mod sqlite;
pub mod store;
pub mod voice;

pub use api::{ApiClient, ApiError, ApiResult, ErrorClass};
pub use config::{load_hearth_config, HearthConfig};
pub use context::{AppContext, ContextHandle, Theme};
pub use error::{ConfigError, Result};
pub use expenses::{ExpenseStore, PaymentMethod};
pub use family::{FamilyStore, MemberRole};
pub use lists::{ListStore, ListType};
pub use meals::{MealEntry, MealGrid, MealPlanStore, RecipeStore};
pub use oauth::{ConnectorService, OAuthCallback, OAuthError, OAuthFlow};
pub use recurrence::{next_due_date, Frequency, RecurrenceError, RecurrenceRule};
pub use store::{Database, DatabaseBuilder, StoreError, StoreResult};
pub use voice::{VoiceAction, VoiceSession};
