// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod detect;
pub mod inspect;
pub mod versions;
pub mod wrap;
