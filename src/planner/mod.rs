//! Statement planning - turns a resolved request into a SELECT [`Query`].
//!
//! Four steps, each in its own module:
//! 1. [`join_builder`] - alias every table and join it to the main table
//! 2. [`filter`] / [`time`] - compile the WHERE condition and bind values
//! 3. [`modifier`] - detect a MAX/MIN aggregation modifier
//! 4. [`compose`] - build the statement for the intent
//!
//! [`Query`]: crate::sql::query::Query

pub mod compose;
pub mod filter;
pub mod join_builder;
pub mod modifier;
pub mod time;

pub use compose::{ComposeOptions, IntentKind, StatementComposer};
pub use filter::{build_where_clause, Bindings, FilterOperator, SqlValue, ValueBinding, WhereOptions};
pub use join_builder::{JoinBuilder, JoinPlan};
pub use modifier::{detect_modifier, AggregationModifier, ModifierPhrases};
pub use time::{TimePeriod, UnknownPeriodPolicy};
