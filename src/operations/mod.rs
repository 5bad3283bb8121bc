pub mod check_op;
pub mod run_op;
