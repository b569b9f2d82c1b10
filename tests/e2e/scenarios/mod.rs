mod credentials;
mod run_queries;
mod trigger_and_wait;
