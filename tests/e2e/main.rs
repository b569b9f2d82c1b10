//! End-to-end scenarios for wfprobe.

mod harness;
mod scenarios;
