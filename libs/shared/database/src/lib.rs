pub mod profiles;
pub mod supabase;

pub use profiles::{InMemoryProfileStore, ProfileStore, SupabaseProfileStore};
