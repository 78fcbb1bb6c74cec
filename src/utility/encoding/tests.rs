// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Encoding, decode, encode};

#[test]
fn test_utf8_strips_bom() {
    assert_eq!(decode(Encoding::Utf8, b"\xef\xbb\xbfhello"), "hello");
    assert_eq!(decode(Encoding::Utf8, "héllo".as_bytes()), "héllo");
}

#[test]
fn test_latin1_round_trip() {
    let bytes = encode(Encoding::Latin1, "Grüße");
    assert_eq!(bytes, b"Gr\xfc\xdfe");
    assert_eq!(decode(Encoding::Latin1, &bytes), "Grüße");
}

#[test]
fn test_latin1_replaces_unrepresentable() {
    assert_eq!(encode(Encoding::Latin1, "a€b"), b"a?b");
}

#[test]
fn test_utf16_writes_bom_and_reads_both_orders() {
    let bytes = encode(Encoding::Utf16, "hi");
    assert_eq!(bytes, vec![0xFF, 0xFE, b'h', 0, b'i', 0]);
    assert_eq!(decode(Encoding::Utf16, &bytes), "hi");
    assert_eq!(decode(Encoding::Utf16, &[0xFE, 0xFF, 0, b'h', 0, b'i']), "hi");
}
