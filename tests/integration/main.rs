//! Integration tests driving the full router with in-process fakes.

mod helpers;

mod authz_test;
mod login_test;
mod session_test;
