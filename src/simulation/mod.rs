pub mod random_market;
