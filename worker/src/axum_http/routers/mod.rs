pub mod hold_sweep;
