#![cfg(test)]
mod fuzzing;
