mod helpers;

mod concurrency;
mod correctness;
