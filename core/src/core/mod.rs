/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
pub mod baseline;
pub mod overrides;
pub mod record;
pub mod resolver;
pub mod tables;
