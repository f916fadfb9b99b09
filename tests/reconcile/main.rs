// Test entry point for reconcile tests
// Every test drives the public API against real temporary trees

mod support;

mod failure_tests;
