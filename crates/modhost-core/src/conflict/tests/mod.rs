pub mod conflict_tests;
