/// This module provides the rotating CSV writer and its encoding options.
pub mod csv;
