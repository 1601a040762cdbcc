mod fetch;
mod self_test;
