pub mod ga;
