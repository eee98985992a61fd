//! 配對寫入
//!
//! 「更新計數器」與「入帳異動」必須作為一個邏輯單元執行。
//! 計數器是權威步驟，先行；流水帳在計數器寫入成功之後才入帳，
//! 中途崩潰不會留下沒有實際庫存變化支撐的帳目。

use stock_core::{
    InventoryRecord, LocationId, MovementKind, NewMovement, Result, StockMovement,
};

use crate::inventory::InventoryStore;
use crate::ledger::MovementLedger;

/// 入帳一筆異動並套用對應的庫存增減
pub fn post_movement(
    store: &InventoryStore,
    ledger: &MovementLedger,
    movement: NewMovement,
) -> Result<(StockMovement, InventoryRecord)> {
    movement.validate()?;

    let delta = movement.kind.signed(movement.quantity);
    let record = store.apply_delta(&movement.sku, &movement.location, delta)?;
    let stored = ledger.append(movement)?;

    Ok((stored, record))
}

/// 管理性修正：覆寫某倉位數量並以差額入帳
///
/// 數量未變時不產生任何帳目，回傳 `None`。
pub fn post_correction(
    store: &InventoryStore,
    ledger: &MovementLedger,
    sku: &str,
    location: &LocationId,
    new_quantity: i64,
    actor: &str,
) -> Result<Option<(StockMovement, InventoryRecord)>> {
    let current = match store.get(sku) {
        Ok(record) => record.quantity(location),
        Err(_) => 0,
    };

    let delta = new_quantity - current;
    if delta == 0 {
        return Ok(None);
    }

    let record = store.set_location_quantity(sku, location, new_quantity)?;

    let kind = if delta > 0 {
        MovementKind::In
    } else {
        MovementKind::Out
    };
    let movement = NewMovement::new(sku, kind, delta.abs(), location.clone())
        .with_reason("manual adjustment")
        .with_actor(actor);
    let stored = ledger.append(movement)?;

    tracing::info!(
        "管理性庫存修正: sku={} location={} {} -> {}",
        sku,
        location,
        current,
        new_quantity
    );

    Ok(Some((stored, record)))
}
