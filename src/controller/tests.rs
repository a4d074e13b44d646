mod controller_test;
mod fixture;
