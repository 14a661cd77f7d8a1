//! End-to-end tests for the inspection wizard.
//!
//! The wizard runs against in-memory `InspectionStore` and `FileStore`
//! fakes, so no database or object storage is needed. Each fake operation
//! can be made to fail to exercise the retry and partial-failure paths.


mod test_api;
mod test_finalize;
mod test_navigation;
mod test_photos;
mod test_registry_flow;
mod test_sessions;
mod test_tests_flow;
