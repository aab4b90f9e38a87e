pub mod currency;
