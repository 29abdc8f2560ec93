/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
// i.MX6 DDR3 bring-up registers and the values most often written to them.
// Units that need anything else get it through the override tables, which
// start right after the last entry here. Append only: existing indices are
// baked into programmed EEPROMs.

pub static ROM_ADDRESSES: &[u32] = &[
    // IOMUXC DDR pads
    0x020E_0798, 0x020E_0758, 0x020E_0588, 0x020E_0594, 0x020E_056C,
    0x020E_0578, 0x020E_074C, 0x020E_057C, 0x020E_058C, 0x020E_059C,
    0x020E_05A0, 0x020E_078C, 0x020E_0750, 0x020E_05A8, 0x020E_05B0,
    0x020E_0524, 0x020E_051C, 0x020E_0518, 0x020E_050C, 0x020E_05B8,
    0x020E_05C0, 0x020E_0774, 0x020E_0784, 0x020E_0788, 0x020E_0794,
    0x020E_079C, 0x020E_07A0, 0x020E_07A4, 0x020E_07A8, 0x020E_0748,
    0x020E_05AC, 0x020E_05B4, 0x020E_0528, 0x020E_0520, 0x020E_0514,
    0x020E_0510, 0x020E_05BC, 0x020E_05C4,
    // MMDC0 calibration
    0x021B_0800, 0x021B_080C, 0x021B_0810, 0x021B_083C, 0x021B_0840,
    0x021B_0848, 0x021B_0850, 0x021B_081C, 0x021B_0820, 0x021B_0824,
    0x021B_0828, 0x021B_08B8, 0x021B_08C0,
    // MMDC1 calibration
    0x021B_480C, 0x021B_4810, 0x021B_483C, 0x021B_4840, 0x021B_4848,
    0x021B_4850, 0x021B_481C, 0x021B_4820, 0x021B_4824, 0x021B_4828,
    0x021B_48B8,
    // MMDC0 core
    0x021B_0004, 0x021B_0008, 0x021B_000C, 0x021B_0010, 0x021B_0014,
    0x021B_0018, 0x021B_001C, 0x021B_002C, 0x021B_0030, 0x021B_0040,
    0x021B_0000, 0x021B_0890, 0x021B_0020, 0x021B_0818, 0x021B_0404,
    0x021B_4818, 0x021B_0058,
];

pub static ROM_VALUES: &[u32] = &[
    0x0000_0000, 0x0000_0030, 0x0000_0028, 0x000C_0000, 0x0002_0000,
    0x0000_3030, 0x0000_0001, 0x0000_0004, 0x0000_0008, 0x0000_8000,
    0x0000_8033, 0x0000_7800, 0xA139_0003, 0x0002_002D, 0x0002_0036,
    0x0033_3333, 0x0022_0000, 0x0001_0000, 0x0000_0800, 0x0000_0033,
    0x0002_5576, 0x0000_0020, 0x0001_1006, 0x3F43_5313, 0xB66E_8B63,
    0x01FF_00DB, 0x0000_1740, 0x0060_80C4, 0x0002_0400,
    0x0000_000F, 0x8000_0000, 0x0000_5800, 0x0040_0000, 0x831A_0000,
    0x0001_0026, 0x0000_7030, 0x0000_6800, 0x0040_8038,
    0x0011_006F, 0x3F2C_0000, 0x0000_0003, 0x0000_0002, 0x0000_0010,
    0x8000_0001, 0x0002_7FFF, 0x0000_0047, 0x0001_C070,
];
