use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use blockmart_core::{Aggregate, AggregateRoot, AccountId, BlockHeight, ContractId};
use blockmart_events::Event;

use crate::error::StoreError;

/// Maximum elapsed block span within which a return is accepted.
///
/// Inclusive: a return exactly at the boundary is still eligible.
pub const DEFAULT_RETURN_WINDOW: u64 = 100;

/// Catalog product identifier, supplied by the owner (not auto-generated).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Catalog entry. Products are never deleted; a depleted product persists
/// with quantity zero and stays queryable by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    quantity: u64,
    /// Listed price in smallest currency unit (e.g. wei). Informational for
    /// purchases: the attached payment is accepted as supplied.
    price: u128,
}

impl ProductRecord {
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn price(&self) -> u128 {
        self.price
    }
}

/// One customer's claim on one unit of a product.
///
/// Kept permanently: a successful return flips `active` off rather than
/// erasing the record, so a later re-purchase reuses the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    purchase_height: BlockHeight,
    payment: u128,
    active: bool,
}

impl Order {
    pub fn purchase_height(&self) -> BlockHeight {
        self.purchase_height
    }

    pub fn payment(&self) -> u128 {
        self.payment
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Aggregate root: Store (inventory/order ledger).
///
/// Owns all products and orders plus the accumulated balance. The owner
/// identity is fixed at construction; the host environment supplies caller
/// identity and block height with every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    id: ContractId,
    owner: AccountId,
    return_window: u64,
    products: HashMap<ProductId, ProductRecord>,
    /// Availability listing: a product id is appended when its quantity
    /// transitions from zero and removed when it drops back to zero.
    available: Vec<ProductId>,
    /// Customers that ever bought a product, in first-purchase order. Slots
    /// are never removed; the active-order map decides who counts.
    buyers: HashMap<ProductId, Vec<AccountId>>,
    orders: HashMap<(AccountId, ProductId), Order>,
    balance: u128,
    version: u64,
}

impl Store {
    pub fn new(id: ContractId, owner: AccountId) -> Self {
        Self::with_return_window(id, owner, DEFAULT_RETURN_WINDOW)
    }

    pub fn with_return_window(id: ContractId, owner: AccountId, return_window: u64) -> Self {
        Self {
            id,
            owner,
            return_window,
            products: HashMap::new(),
            available: Vec::new(),
            buyers: HashMap::new(),
            orders: HashMap::new(),
            balance: 0,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> ContractId {
        self.id
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn return_window(&self) -> u64 {
        self.return_window
    }

    /// Product ids with stock remaining, in availability order: ids keep
    /// their insertion position until depleted and re-enter at the tail when
    /// restocked or restored by a return.
    pub fn available_products(&self) -> &[ProductId] {
        &self.available
    }

    /// Distinct customers holding an active (not-returned) order for the
    /// product, in the order of their first purchase.
    pub fn customers_by_product(&self, product_id: ProductId) -> Vec<AccountId> {
        self.buyers
            .get(&product_id)
            .map(|customers| {
                customers
                    .iter()
                    .copied()
                    .filter(|customer| self.has_active_order(*customer, product_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Funds retained after accounting for refunds. Publicly readable.
    pub fn total_balance(&self) -> u128 {
        self.balance
    }

    /// Catalog lookup by id; depleted products remain queryable.
    pub fn product(&self, product_id: ProductId) -> Option<&ProductRecord> {
        self.products.get(&product_id)
    }

    pub fn has_active_order(&self, customer: AccountId, product_id: ProductId) -> bool {
        self.orders
            .get(&(customer, product_id))
            .is_some_and(|order| order.active)
    }
}

impl AggregateRoot for Store {
    type Id = ContractId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddProduct (owner only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddProduct {
    pub caller: AccountId,
    pub product_id: ProductId,
    pub quantity: u64,
    pub price: u128,
    pub height: BlockHeight,
}

/// Command: UpdateQuantity (owner only). Zero is the documented delisting
/// mechanism; the product itself is never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantity {
    pub caller: AccountId,
    pub product_id: ProductId,
    pub quantity: u64,
    pub height: BlockHeight,
}

/// Command: BuyProduct (any caller except the owner). `payment` is the value
/// attached by the host; it is retained as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyProduct {
    pub caller: AccountId,
    pub product_id: ProductId,
    pub payment: u128,
    pub height: BlockHeight,
}

/// Command: ReturnProduct (holder of an active order, within the window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnProduct {
    pub caller: AccountId,
    pub product_id: ProductId,
    pub height: BlockHeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreCommand {
    AddProduct(AddProduct),
    UpdateQuantity(UpdateQuantity),
    BuyProduct(BuyProduct),
    ReturnProduct(ReturnProduct),
}

/// Event: ProductAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAdded {
    pub product_id: ProductId,
    pub quantity: u64,
    pub price: u128,
    pub height: BlockHeight,
}

/// Event: QuantityUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdated {
    pub product_id: ProductId,
    pub quantity: u64,
    pub height: BlockHeight,
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub product_id: ProductId,
    pub customer: AccountId,
    pub payment: u128,
    pub height: BlockHeight,
}

/// Event: ReturnInitiated. `refund` equals the original payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInitiated {
    pub product_id: ProductId,
    pub customer: AccountId,
    pub refund: u128,
    pub height: BlockHeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
    ProductAdded(ProductAdded),
    QuantityUpdated(QuantityUpdated),
    OrderPlaced(OrderPlaced),
    ReturnInitiated(ReturnInitiated),
}

impl Event for StoreEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StoreEvent::ProductAdded(_) => "store.product.added",
            StoreEvent::QuantityUpdated(_) => "store.product.quantity_updated",
            StoreEvent::OrderPlaced(_) => "store.order.placed",
            StoreEvent::ReturnInitiated(_) => "store.order.return_initiated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn height(&self) -> BlockHeight {
        match self {
            StoreEvent::ProductAdded(e) => e.height,
            StoreEvent::QuantityUpdated(e) => e.height,
            StoreEvent::OrderPlaced(e) => e.height,
            StoreEvent::ReturnInitiated(e) => e.height,
        }
    }
}

impl Aggregate for Store {
    type Command = StoreCommand;
    type Event = StoreEvent;
    type Error = StoreError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StoreEvent::ProductAdded(e) => {
                self.products.insert(
                    e.product_id,
                    ProductRecord {
                        quantity: e.quantity,
                        price: e.price,
                    },
                );
                if e.quantity > 0 {
                    self.available.push(e.product_id);
                }
            }
            StoreEvent::QuantityUpdated(e) => {
                if let Some(product) = self.products.get_mut(&e.product_id) {
                    let was_listed = product.quantity > 0;
                    product.quantity = e.quantity;
                    match (was_listed, e.quantity > 0) {
                        (true, false) => self.available.retain(|id| *id != e.product_id),
                        (false, true) => self.available.push(e.product_id),
                        _ => {}
                    }
                }
            }
            StoreEvent::OrderPlaced(e) => {
                if let Some(product) = self.products.get_mut(&e.product_id) {
                    product.quantity = product.quantity.saturating_sub(1);
                    if product.quantity == 0 {
                        self.available.retain(|id| *id != e.product_id);
                    }
                }
                let key = (e.customer, e.product_id);
                if !self.orders.contains_key(&key) {
                    self.buyers.entry(e.product_id).or_default().push(e.customer);
                }
                self.orders.insert(
                    key,
                    Order {
                        purchase_height: e.height,
                        payment: e.payment,
                        active: true,
                    },
                );
                self.balance = self.balance.saturating_add(e.payment);
            }
            StoreEvent::ReturnInitiated(e) => {
                if let Some(product) = self.products.get_mut(&e.product_id) {
                    if product.quantity == 0 {
                        self.available.push(e.product_id);
                    }
                    product.quantity = product.quantity.saturating_add(1);
                }
                if let Some(order) = self.orders.get_mut(&(e.customer, e.product_id)) {
                    order.active = false;
                }
                self.balance = self.balance.saturating_sub(e.refund);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StoreCommand::AddProduct(cmd) => self.handle_add_product(cmd),
            StoreCommand::UpdateQuantity(cmd) => self.handle_update_quantity(cmd),
            StoreCommand::BuyProduct(cmd) => self.handle_buy(cmd),
            StoreCommand::ReturnProduct(cmd) => self.handle_return(cmd),
        }
    }
}

impl Store {
    fn ensure_owner(&self, caller: AccountId) -> Result<(), StoreError> {
        if caller != self.owner {
            return Err(StoreError::authorization("caller is not the owner"));
        }
        Ok(())
    }

    fn handle_add_product(&self, cmd: &AddProduct) -> Result<Vec<StoreEvent>, StoreError> {
        self.ensure_owner(cmd.caller)?;

        // A once-used id is taken forever, even after depletion.
        if self.products.contains_key(&cmd.product_id) {
            return Err(StoreError::product_duplication("It has already been added."));
        }
        if cmd.quantity == 0 {
            return Err(StoreError::product_quantity("Should be greater than zero."));
        }

        Ok(vec![StoreEvent::ProductAdded(ProductAdded {
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            price: cmd.price,
            height: cmd.height,
        })])
    }

    fn handle_update_quantity(&self, cmd: &UpdateQuantity) -> Result<Vec<StoreEvent>, StoreError> {
        self.ensure_owner(cmd.caller)?;

        if !self.products.contains_key(&cmd.product_id) {
            return Err(StoreError::product_missing("No such product."));
        }

        Ok(vec![StoreEvent::QuantityUpdated(QuantityUpdated {
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            height: cmd.height,
        })])
    }

    fn handle_buy(&self, cmd: &BuyProduct) -> Result<Vec<StoreEvent>, StoreError> {
        if cmd.caller == self.owner {
            return Err(StoreError::authorization("Not allowed for the owner."));
        }

        // Never-added and sold-out products fail identically: buyers cannot
        // distinguish them.
        match self.products.get(&cmd.product_id) {
            None => return Err(StoreError::product_missing("No such product is available.")),
            Some(product) if product.quantity == 0 => {
                return Err(StoreError::product_missing("No such product is available."));
            }
            Some(_) => {}
        }

        if self.has_active_order(cmd.caller, cmd.product_id) {
            return Err(StoreError::order(
                "The customer has already bought the same product.",
            ));
        }

        Ok(vec![StoreEvent::OrderPlaced(OrderPlaced {
            product_id: cmd.product_id,
            customer: cmd.caller,
            payment: cmd.payment,
            height: cmd.height,
        })])
    }

    fn handle_return(&self, cmd: &ReturnProduct) -> Result<Vec<StoreEvent>, StoreError> {
        let order = self
            .orders
            .get(&(cmd.caller, cmd.product_id))
            .filter(|order| order.active)
            .ok_or_else(|| {
                StoreError::return_rejected("The customer hasn't bought such product.")
            })?;

        let elapsed = cmd.height.elapsed_since(order.purchase_height);
        if elapsed > self.return_window {
            return Err(StoreError::return_rejected("The deadline is not met."));
        }

        Ok(vec![StoreEvent::ReturnInitiated(ReturnInitiated {
            product_id: cmd.product_id,
            customer: cmd.caller,
            refund: order.payment,
            height: cmd.height,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_store() -> (Store, AccountId) {
        let owner = AccountId::new();
        (Store::new(ContractId::new(), owner), owner)
    }

    fn at(height: u64) -> BlockHeight {
        BlockHeight::new(height)
    }

    fn add(store: &mut Store, caller: AccountId, id: u64, quantity: u64, price: u128) {
        store
            .execute(&StoreCommand::AddProduct(AddProduct {
                caller,
                product_id: ProductId(id),
                quantity,
                price,
                height: at(1),
            }))
            .unwrap();
    }

    fn set_quantity(store: &mut Store, caller: AccountId, id: u64, quantity: u64) {
        store
            .execute(&StoreCommand::UpdateQuantity(UpdateQuantity {
                caller,
                product_id: ProductId(id),
                quantity,
                height: at(1),
            }))
            .unwrap();
    }

    fn buy(
        store: &mut Store,
        caller: AccountId,
        id: u64,
        payment: u128,
        height: u64,
    ) -> Result<Vec<StoreEvent>, StoreError> {
        store.execute(&StoreCommand::BuyProduct(BuyProduct {
            caller,
            product_id: ProductId(id),
            payment,
            height: at(height),
        }))
    }

    fn return_product(
        store: &mut Store,
        caller: AccountId,
        id: u64,
        height: u64,
    ) -> Result<Vec<StoreEvent>, StoreError> {
        store.execute(&StoreCommand::ReturnProduct(ReturnProduct {
            caller,
            product_id: ProductId(id),
            height: at(height),
        }))
    }

    #[test]
    fn add_product_emits_product_added_event() {
        let (store, owner) = new_store();
        let events = store
            .handle(&StoreCommand::AddProduct(AddProduct {
                caller: owner,
                product_id: ProductId(111),
                quantity: 2,
                price: 1,
                height: at(1),
            }))
            .unwrap();

        assert_eq!(events.len(), 1);
        match &events[0] {
            StoreEvent::ProductAdded(e) => {
                assert_eq!(e.product_id, ProductId(111));
                assert_eq!(e.quantity, 2);
                assert_eq!(e.price, 1);
            }
            _ => panic!("Expected ProductAdded event"),
        }
        assert_eq!(events[0].event_type(), "store.product.added");
    }

    #[test]
    fn added_products_are_listed_in_insertion_order() {
        let (mut store, owner) = new_store();
        add(&mut store, owner, 111, 2, 1);
        add(&mut store, owner, 222, 5, 3);

        assert_eq!(
            store.available_products(),
            &[ProductId(111), ProductId(222)]
        );
    }

    #[test]
    fn re_adding_an_existing_id_fails_regardless_of_stock() {
        let (mut store, owner) = new_store();
        add(&mut store, owner, 333, 2, 3);

        let err = store
            .handle(&StoreCommand::AddProduct(AddProduct {
                caller: owner,
                product_id: ProductId(333),
                quantity: 7,
                price: 9,
                height: at(2),
            }))
            .unwrap_err();
        assert!(matches!(err, StoreError::ProductDuplication(_)));

        // Depletion does not free the id.
        set_quantity(&mut store, owner, 333, 0);
        let err = store
            .handle(&StoreCommand::AddProduct(AddProduct {
                caller: owner,
                product_id: ProductId(333),
                quantity: 1,
                price: 3,
                height: at(3),
            }))
            .unwrap_err();
        assert!(matches!(err, StoreError::ProductDuplication(_)));
    }

    #[test]
    fn zero_quantity_product_is_rejected() {
        let (store, owner) = new_store();
        let err = store
            .handle(&StoreCommand::AddProduct(AddProduct {
                caller: owner,
                product_id: ProductId(444),
                quantity: 0,
                price: 3,
                height: at(1),
            }))
            .unwrap_err();
        assert!(matches!(err, StoreError::ProductQuantity(_)));
    }

    #[test]
    fn only_owner_may_administer_the_catalog() {
        let (mut store, owner) = new_store();
        let customer = AccountId::new();
        add(&mut store, owner, 888, 1, 3);

        let err = store
            .handle(&StoreCommand::AddProduct(AddProduct {
                caller: customer,
                product_id: ProductId(555),
                quantity: 1,
                price: 3,
                height: at(1),
            }))
            .unwrap_err();
        assert!(matches!(err, StoreError::Authorization(_)));

        let err = store
            .handle(&StoreCommand::UpdateQuantity(UpdateQuantity {
                caller: customer,
                product_id: ProductId(888),
                quantity: 0,
                height: at(1),
            }))
            .unwrap_err();
        assert!(matches!(err, StoreError::Authorization(_)));
    }

    #[test]
    fn update_quantity_delists_at_zero_and_relists_at_tail() {
        let (mut store, owner) = new_store();
        add(&mut store, owner, 666, 1, 3);
        add(&mut store, owner, 667, 1, 3);

        set_quantity(&mut store, owner, 666, 0);
        assert_eq!(store.available_products(), &[ProductId(667)]);
        // Delisted, not deleted.
        assert_eq!(store.product(ProductId(666)).unwrap().quantity(), 0);

        set_quantity(&mut store, owner, 666, 4);
        assert_eq!(
            store.available_products(),
            &[ProductId(667), ProductId(666)]
        );
        assert_eq!(store.product(ProductId(666)).unwrap().quantity(), 4);
    }

    #[test]
    fn updating_an_unknown_product_fails() {
        let (store, owner) = new_store();
        let err = store
            .handle(&StoreCommand::UpdateQuantity(UpdateQuantity {
                caller: owner,
                product_id: ProductId(777),
                quantity: 1,
                height: at(1),
            }))
            .unwrap_err();
        assert!(matches!(err, StoreError::ProductMissing(_)));
    }

    #[test]
    fn owner_may_never_buy() {
        let (mut store, owner) = new_store();
        add(&mut store, owner, 202, 1, 3);

        let err = buy(&mut store, owner, 202, 3, 2).unwrap_err();
        assert_eq!(
            err,
            StoreError::authorization("Not allowed for the owner.")
        );
    }

    #[test]
    fn buy_decrements_stock_and_records_the_customer() {
        let (mut store, owner) = new_store();
        let customer = AccountId::new();
        add(&mut store, owner, 999, 2, 3);

        let events = buy(&mut store, customer, 999, 3, 5).unwrap();
        match &events[0] {
            StoreEvent::OrderPlaced(e) => {
                assert_eq!(e.product_id, ProductId(999));
                assert_eq!(e.customer, customer);
                assert_eq!(e.payment, 3);
                assert_eq!(e.height, at(5));
            }
            _ => panic!("Expected OrderPlaced event"),
        }

        assert_eq!(store.product(ProductId(999)).unwrap().quantity(), 1);
        assert_eq!(store.customers_by_product(ProductId(999)), vec![customer]);
        assert_eq!(store.total_balance(), 3);
        assert!(store.has_active_order(customer, ProductId(999)));
    }

    #[test]
    fn unknown_and_sold_out_products_fail_a_purchase_alike() {
        let (mut store, owner) = new_store();
        let customer = AccountId::new();

        let missing = buy(&mut store, customer, 123, 3, 2).unwrap_err();
        assert!(matches!(&missing, StoreError::ProductMissing(_)));

        add(&mut store, owner, 124, 1, 3);
        set_quantity(&mut store, owner, 124, 0);
        let sold_out = buy(&mut store, customer, 124, 3, 2).unwrap_err();
        assert_eq!(missing, sold_out);
    }

    #[test]
    fn second_purchase_needs_a_return_first() {
        let (mut store, owner) = new_store();
        let customer1 = AccountId::new();
        let customer2 = AccountId::new();
        add(&mut store, owner, 101, 2, 3);

        buy(&mut store, customer1, 101, 3, 2).unwrap();
        let err = buy(&mut store, customer1, 101, 3, 3).unwrap_err();
        assert!(matches!(err, StoreError::Order(_)));

        // Other customers are unaffected by the rule.
        buy(&mut store, customer2, 101, 3, 4).unwrap();

        // After a return the same customer may buy again.
        return_product(&mut store, customer1, 101, 5).unwrap();
        buy(&mut store, customer1, 101, 3, 6).unwrap();
    }

    #[test]
    fn return_restores_stock_and_refunds_the_payment() {
        let (mut store, owner) = new_store();
        let customer = AccountId::new();
        add(&mut store, owner, 303, 1, 3);

        buy(&mut store, customer, 303, 3, 10).unwrap();
        assert_eq!(store.available_products(), &[] as &[ProductId]);

        let events = return_product(&mut store, customer, 303, 12).unwrap();
        match &events[0] {
            StoreEvent::ReturnInitiated(e) => {
                assert_eq!(e.product_id, ProductId(303));
                assert_eq!(e.customer, customer);
                assert_eq!(e.refund, 3);
            }
            _ => panic!("Expected ReturnInitiated event"),
        }

        assert_eq!(store.product(ProductId(303)).unwrap().quantity(), 1);
        assert_eq!(store.available_products(), &[ProductId(303)]);
        assert!(store.customers_by_product(ProductId(303)).is_empty());
        assert_eq!(store.total_balance(), 0);
        assert!(!store.has_active_order(customer, ProductId(303)));
    }

    #[test]
    fn return_without_a_purchase_fails() {
        let (mut store, _) = new_store();
        let customer = AccountId::new();
        let err = return_product(&mut store, customer, 404, 2).unwrap_err();
        assert_eq!(
            err,
            StoreError::return_rejected("The customer hasn't bought such product.")
        );
    }

    #[test]
    fn return_at_the_window_boundary_is_eligible() {
        let (mut store, owner) = new_store();
        let customer = AccountId::new();
        add(&mut store, owner, 505, 1, 3);

        buy(&mut store, customer, 505, 3, 10).unwrap();
        return_product(&mut store, customer, 505, 10 + DEFAULT_RETURN_WINDOW).unwrap();
    }

    #[test]
    fn late_return_is_rejected_and_leaves_state_unchanged() {
        let (mut store, owner) = new_store();
        let customer = AccountId::new();
        add(&mut store, owner, 505, 1, 3);

        buy(&mut store, customer, 505, 3, 10).unwrap();
        let version_before = store.version();

        let err =
            return_product(&mut store, customer, 505, 10 + DEFAULT_RETURN_WINDOW + 1).unwrap_err();
        assert_eq!(err, StoreError::return_rejected("The deadline is not met."));

        assert_eq!(store.version(), version_before);
        assert_eq!(store.product(ProductId(505)).unwrap().quantity(), 0);
        assert_eq!(store.available_products(), &[] as &[ProductId]);
        assert_eq!(store.customers_by_product(ProductId(505)), vec![customer]);
        assert_eq!(store.total_balance(), 3);
    }

    #[test]
    fn configured_return_window_is_honored() {
        let owner = AccountId::new();
        let mut store = Store::with_return_window(ContractId::new(), owner, 5);
        let customer = AccountId::new();
        add(&mut store, owner, 1, 1, 3);

        buy(&mut store, customer, 1, 3, 10).unwrap();
        let err = return_product(&mut store, customer, 1, 16).unwrap_err();
        assert!(matches!(err, StoreError::Return(_)));
    }

    #[test]
    fn depleted_product_reappears_after_a_return() {
        let (mut store, owner) = new_store();
        let customer1 = AccountId::new();
        let customer2 = AccountId::new();
        add(&mut store, owner, 999, 2, 3);

        buy(&mut store, customer1, 999, 3, 2).unwrap();
        buy(&mut store, customer2, 999, 3, 3).unwrap();
        assert_eq!(store.available_products(), &[] as &[ProductId]);

        return_product(&mut store, customer1, 999, 4).unwrap();
        assert_eq!(store.available_products(), &[ProductId(999)]);
        assert_eq!(store.product(ProductId(999)).unwrap().quantity(), 1);
    }

    #[test]
    fn availability_listing_tracks_stock_transitions() {
        let (mut store, owner) = new_store();
        let customer1 = AccountId::new();
        let customer2 = AccountId::new();
        add(&mut store, owner, 606, 1, 3);
        add(&mut store, owner, 707, 1, 3);
        add(&mut store, owner, 808, 1, 3);
        add(&mut store, owner, 909, 1, 3);
        set_quantity(&mut store, owner, 909, 0);

        buy(&mut store, customer1, 606, 3, 2).unwrap();
        buy(&mut store, customer2, 808, 3, 3).unwrap();
        return_product(&mut store, customer1, 606, 4).unwrap();

        // 707 never left the listing; 606 re-entered at the tail.
        assert_eq!(
            store.available_products(),
            &[ProductId(707), ProductId(606)]
        );
    }

    #[test]
    fn buyer_slots_survive_a_return_and_rebuy() {
        let (mut store, owner) = new_store();
        let customer1 = AccountId::new();
        let customer2 = AccountId::new();
        let customer3 = AccountId::new();
        add(&mut store, owner, 102, 2, 3);
        add(&mut store, owner, 201, 2, 3);
        add(&mut store, owner, 301, 2, 3);

        buy(&mut store, customer1, 102, 3, 2).unwrap();
        buy(&mut store, customer1, 201, 3, 3).unwrap();
        buy(&mut store, customer2, 102, 3, 4).unwrap();
        buy(&mut store, customer3, 201, 3, 5).unwrap();
        buy(&mut store, customer3, 301, 3, 6).unwrap();
        return_product(&mut store, customer1, 201, 7).unwrap();
        buy(&mut store, customer1, 201, 3, 8).unwrap();

        // customer1 keeps the first-purchase slot despite the rebuy.
        assert_eq!(
            store.customers_by_product(ProductId(201)),
            vec![customer1, customer3]
        );
    }

    #[test]
    fn balance_accumulates_payments_minus_refunds() {
        let (mut store, owner) = new_store();
        let customer1 = AccountId::new();
        let customer2 = AccountId::new();
        let customer3 = AccountId::new();
        add(&mut store, owner, 987, 1, 1);
        add(&mut store, owner, 654, 1, 1);
        add(&mut store, owner, 321, 1, 3);

        buy(&mut store, customer1, 987, 3, 2).unwrap();
        buy(&mut store, customer2, 654, 5, 3).unwrap();
        buy(&mut store, customer3, 321, 3, 4).unwrap();
        return_product(&mut store, customer1, 987, 5).unwrap();

        assert_eq!(store.total_balance(), 3 + 5 + 3 - 3);
    }

    #[test]
    fn events_serialize_to_json() {
        let customer = AccountId::new();
        let event = StoreEvent::OrderPlaced(OrderPlaced {
            product_id: ProductId(42),
            customer,
            payment: 7,
            height: at(9),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["OrderPlaced"]["product_id"], 42);
        assert_eq!(json["OrderPlaced"]["payment"], 7);
        assert_eq!(json["OrderPlaced"]["height"], 9);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any set of purchases and in-window returns, the
        /// accumulated balance equals payments retained minus refunds, and
        /// stock plus active orders conserves the initial quantity.
        #[test]
        fn balance_and_stock_are_conserved(
            purchases in prop::collection::vec((1u128..1_000_000u128, any::<bool>()), 1..12)
        ) {
            let owner = AccountId::new();
            let mut store = Store::new(ContractId::new(), owner);
            let product_id = ProductId(1);
            let initial_quantity = purchases.len() as u64;

            store
                .execute(&StoreCommand::AddProduct(AddProduct {
                    caller: owner,
                    product_id,
                    quantity: initial_quantity,
                    price: 3,
                    height: BlockHeight::new(1),
                }))
                .unwrap();

            let mut retained: u128 = 0;
            let mut active_orders: u64 = 0;
            let mut expected_customers = Vec::new();

            for (payment, returns) in &purchases {
                let customer = AccountId::new();
                store
                    .execute(&StoreCommand::BuyProduct(BuyProduct {
                        caller: customer,
                        product_id,
                        payment: *payment,
                        height: BlockHeight::new(10),
                    }))
                    .unwrap();

                if *returns {
                    store
                        .execute(&StoreCommand::ReturnProduct(ReturnProduct {
                            caller: customer,
                            product_id,
                            height: BlockHeight::new(20),
                        }))
                        .unwrap();
                } else {
                    retained += payment;
                    active_orders += 1;
                    expected_customers.push(customer);
                }
            }

            prop_assert_eq!(store.total_balance(), retained);

            let quantity = store.product(product_id).map(|p| p.quantity()).unwrap_or(0);
            prop_assert_eq!(quantity + active_orders, initial_quantity);
            prop_assert_eq!(
                store.available_products().contains(&product_id),
                quantity > 0
            );
            prop_assert_eq!(store.customers_by_product(product_id), expected_customers);
        }
    }
}
