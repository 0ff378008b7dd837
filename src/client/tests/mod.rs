//! Unit tests for the client context.

mod status_transition_tests;
