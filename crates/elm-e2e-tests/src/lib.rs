//! End-to-end tests live under `tests/`. They drive `elm-serial`,
//! `elm-obd` and `elm-diag` together against a simulated ELM327 on an
//! in-memory serial line.
