mod cli_tests;
mod utils;
