mod helpers;
mod home;
mod subscriptions;

// all integration tests live in one binary: each tests/*.rs file would be its
// own executable, and linking is sequential
