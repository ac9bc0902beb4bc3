//! Raw declarations from libossia's `ossia-c.h`.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_int, c_void};

pub type ossia_node_t = *mut c_void;
pub type ossia_address_t = *mut c_void;
pub type ossia_node_callback_idx_t = *mut c_void;
pub type ossia_type = c_int;

pub type ossia_node_callback_t = extern "C" fn(ctx: *mut c_void, node: ossia_node_t);

#[link(name = "ossia")]
extern "C" {
    pub fn ossia_node_add_child(node: ossia_node_t, name: *const c_char) -> ossia_node_t;
    pub fn ossia_node_remove_child(node: ossia_node_t, child: ossia_node_t);

    pub fn ossia_node_get_name(node: ossia_node_t) -> *const c_char;
    pub fn ossia_string_free(text: *const c_char);
    pub fn ossia_node_child_size(node: ossia_node_t) -> c_int;
    pub fn ossia_node_get_child(node: ossia_node_t, index: c_int) -> ossia_node_t;

    pub fn ossia_node_get_address(node: ossia_node_t) -> ossia_address_t;
    pub fn ossia_node_create_address(node: ossia_node_t, ty: ossia_type) -> ossia_address_t;
    pub fn ossia_node_remove_address(node: ossia_node_t, address: ossia_address_t);

    pub fn ossia_node_create(root: ossia_node_t, path: *const c_char) -> ossia_node_t;
    pub fn ossia_node_find(root: ossia_node_t, path: *const c_char) -> ossia_node_t;

    pub fn ossia_node_find_pattern(
        root: ossia_node_t,
        pattern: *const c_char,
        data: *mut *mut ossia_node_t,
        size: *mut usize,
    );
    pub fn ossia_node_create_pattern(
        root: ossia_node_t,
        pattern: *const c_char,
        data: *mut *mut ossia_node_t,
        size: *mut usize,
    );
    pub fn ossia_node_array_free(data: *mut ossia_node_t);

    pub fn ossia_node_add_deleting_callback(
        node: ossia_node_t,
        callback: ossia_node_callback_t,
        ctx: *mut c_void,
    ) -> ossia_node_callback_idx_t;
    pub fn ossia_node_remove_deleting_callback(node: ossia_node_t, index: ossia_node_callback_idx_t);
}
