// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request payloads handed to plugin scripts. The debug context of the
//! inbound call is threaded through every one of them.

use serde::Serialize;

#[derive(Serialize)]
pub(super) struct Dbg<'a> {
    pub dbg: &'a str,
}

#[derive(Serialize)]
pub(super) struct SrUri<'a> {
    pub dbg: &'a str,
    pub uri: &'a str,
}

#[derive(Serialize)]
pub(super) struct SrCreate<'a> {
    pub dbg: &'a str,
    pub uri: &'a str,
    pub name: &'a str,
    pub description: &'a str,
}

#[derive(Serialize)]
pub(super) struct Sr<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
}

#[derive(Serialize)]
pub(super) struct SrRename<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub new_name: &'a str,
}

#[derive(Serialize)]
pub(super) struct SrRedescribe<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub new_description: &'a str,
}

#[derive(Serialize)]
pub(super) struct Vol<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub key: &'a str,
}

#[derive(Serialize)]
pub(super) struct VolCreate<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub size: u64,
}

#[derive(Serialize)]
pub(super) struct VolRename<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub key: &'a str,
    pub new_name: &'a str,
}

#[derive(Serialize)]
pub(super) struct VolRedescribe<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub key: &'a str,
    pub new_description: &'a str,
}

#[derive(Serialize)]
pub(super) struct VolResize<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub key: &'a str,
    pub new_size: u64,
}

#[derive(Serialize)]
pub(super) struct VolSet<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub key: &'a str,
    pub k: &'a str,
    pub v: &'a str,
}

#[derive(Serialize)]
pub(super) struct VolUnset<'a> {
    pub dbg: &'a str,
    pub sr: &'a str,
    pub key: &'a str,
    pub k: &'a str,
}

#[derive(Serialize)]
pub(super) struct Dp<'a> {
    pub dbg: &'a str,
    pub uri: &'a str,
    pub domain: &'a str,
}

#[derive(Serialize)]
pub(super) struct DpOpen<'a> {
    pub dbg: &'a str,
    pub uri: &'a str,
    pub persistent: bool,
}

#[derive(Serialize)]
pub(super) struct DpClose<'a> {
    pub dbg: &'a str,
    pub uri: &'a str,
}
