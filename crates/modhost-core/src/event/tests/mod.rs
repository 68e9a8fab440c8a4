pub mod broadcaster_tests;
