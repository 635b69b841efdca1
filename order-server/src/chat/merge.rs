//! Line-item identity & merge rules
//!
//! 购物车和 Draft 订单对账共用同一套身份规则：
//! 两行相同 ⇔ `menu_item_id` 相同且规范化后的 notes 相同。
//! 所有比较都经过 [`normalize`]，两条路径不会各自发明一套 key。

use shared::intent::{MAX_LINE_QUANTITY, RequestedItem};
use shared::models::CartLine;

use super::error::ChatError;

/// Trim + lowercase; whitespace-only → `""`
pub fn normalize(notes: &str) -> String {
    notes.trim().to_lowercase()
}

/// Join customization pieces into normalized notes
///
/// 每段先 trim，空段丢弃，用 `", "` 连接后再 [`normalize`]。
pub fn notes_from_extras(extras: &[String], free_text: Option<&str>) -> String {
    let joined = extras
        .iter()
        .map(String::as_str)
        .chain(free_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    normalize(&joined)
}

/// Notes for a requested item: size first, then extras, then free text
pub fn requested_notes(item: &RequestedItem) -> String {
    let size = item
        .size
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("size: {s}"));
    let mut pieces: Vec<String> = size.into_iter().collect();
    pieces.extend(item.extras.iter().cloned());
    notes_from_extras(&pieces, item.notes.as_deref())
}

/// Identity key shared by the cart and the persisted draft
pub fn line_key(menu_item_id: i64, notes: &str) -> (i64, String) {
    (menu_item_id, normalize(notes))
}

pub fn same_line(a: &CartLine, b: &CartLine) -> bool {
    line_key(a.menu_item_id, &a.notes) == line_key(b.menu_item_id, &b.notes)
}

/// Merge `incoming` into `cart`
///
/// Existing identical line: quantity is summed, notes overwritten (last write
/// wins). Otherwise the line is appended. Returns `true` when merged.
///
/// A sum above [`MAX_LINE_QUANTITY`] leaves the cart untouched.
pub fn merge_line(cart: &mut Vec<CartLine>, mut incoming: CartLine) -> Result<bool, ChatError> {
    incoming.notes = normalize(&incoming.notes);
    match cart.iter_mut().find(|line| same_line(line, &incoming)) {
        Some(line) => {
            line.quantity = line
                .quantity
                .checked_add(incoming.quantity)
                .filter(|q| *q <= MAX_LINE_QUANTITY)
                .ok_or_else(|| ChatError::QuantityLimit {
                    item: line.name.clone(),
                    max: MAX_LINE_QUANTITY,
                })?;
            line.notes = incoming.notes;
            line.unit_price = incoming.unit_price;
            if incoming.size.is_some() {
                line.size = incoming.size;
            }
            Ok(true)
        }
        None => {
            cart.push(incoming);
            Ok(false)
        }
    }
}

/// Indexes of cart lines a free-text target refers to
///
/// Exact case-insensitive name matches win; only when none exist does the
/// case-insensitive substring match apply ("Kebab" hits every kebab).
pub fn match_target(cart: &[CartLine], target: &str) -> Vec<usize> {
    let target = normalize(target);
    if target.is_empty() {
        return Vec::new();
    }

    let exact: Vec<usize> = cart
        .iter()
        .enumerate()
        .filter(|(_, line)| normalize(&line.name) == target)
        .map(|(i, _)| i)
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    cart.iter()
        .enumerate()
        .filter(|(_, line)| normalize(&line.name).contains(&target))
        .map(|(i, _)| i)
        .collect()
}
