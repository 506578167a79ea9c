//! Subscriber data repository core.
//!
//! Everything between the HTTP handlers of a unified data repository and
//! its document database:
//! - registers subscriptions to data changes, event exposure and policy
//!   data in memory, per subscriber
//! - applies merge (RFC 7396) and structural (RFC 6902) patches to stored
//!   documents, translating identifier keys that the store cannot hold
//! - narrows bulk query results with list-valued criteria
//! - emits a change notification after every successful patch
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Registry**: [`SubscriptionRegistry`], scope containers guarded by a
//!   per-scope lock inside a concurrent map
//! - **Patch**: [`PatchEngine`], the only writer of subscriber documents
//! - **Notify**: [`ChangeNotifier`], the hook that receives persisted changes
//! - **Ids**: [`IdGenerator`], per-kind subscription id sequences
//!
//! The document store is a collaborator ([`udr_store::DocumentStore`]); no
//! component spawns background work.
//!
//! # Example
//!
//! ```
//! use udr_model::{PolicyDataSubscription, Subscription};
//! use udr_repository::SubscriptionRegistry;
//! use udr_types::{SubscriberScope, SubscriptionKind};
//!
//! let registry = SubscriptionRegistry::new();
//! let scope = SubscriberScope::Global;
//! let id = registry.add(
//!     &scope,
//!     Subscription::PolicyData(PolicyDataSubscription {
//!         notification_uri: "http://pcf.example/notify".into(),
//!         ..Default::default()
//!     }),
//! );
//!
//! assert_eq!(id.as_str(), "0");
//! assert_eq!(registry.list(&scope, SubscriptionKind::PolicyData).unwrap().len(), 1);
//! ```

mod config;
mod error;
mod ids;
pub mod logging;
pub mod notify;
pub mod patch;
pub mod registry;

pub use config::RepositoryConfig;
pub use error::{Missing, RepoError, RepoResult};
pub use ids::{CounterIdGenerator, IdGenerator};
pub use notify::{ChangeNotifier, DataChangeNotification, NoopNotifier, NotifyError, SubmittedChange};
pub use patch::{apply_ops_to_value, PatchEngine, PatchOutcome, WriteOutcome};
pub use registry::{ScopeContainer, SubscriptionRegistry};
