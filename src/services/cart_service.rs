use crate::{
    catalog::{CatalogClient, CatalogError},
    entities::{
        cart, cart_item,
        cart_item::LineItemRef,
        Cart, CartItem,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{currency::CurrencyGuard, totals},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, ModelTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// The cart aggregate. Sole owner of cart mutations.
///
/// Every mutating operation runs inside one serializable transaction spanning
/// load-or-create, validation, the item delta, a full item reload and the
/// totals rewrite, so a failure at any step leaves no partial state. Cart
/// rows exist exactly while they hold items: the first add creates the row,
/// removing the last line (or clearing) deletes it.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    catalog: Arc<dyn CatalogClient>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        catalog: Arc<dyn CatalogClient>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            catalog,
            event_sender,
        }
    }

    /// Adds an item to the owner's active cart, creating the cart if none
    /// exists.
    ///
    /// The unit price, currency and display fields are snapshotted from the
    /// catalog at this moment; later catalog changes never touch the line.
    ///
    /// # Errors
    ///
    /// * `BadRequest` - malformed currency code, non-positive quantity, or a
    ///   currency that differs from the cart's established one
    /// * `Conflict` - the (item_type, item_id) pair is already in the cart
    /// * `NotFound` - the catalog does not know the item, or has no active
    ///   price for it in the requested currency
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        owner_id: Uuid,
        input: AddItemInput,
    ) -> Result<CartWithItems, ServiceError> {
        CurrencyGuard::validate_code(&input.currency_code)?;
        if input.quantity < 1 {
            return Err(ServiceError::BadRequest(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let txn = self.begin().await?;

        let existing = Self::active_cart(&txn, owner_id).await?;
        let created = existing.is_none();

        let cart = match existing {
            Some(cart) => cart,
            None => {
                let now = Utc::now();
                cart::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    owner_id: Set(owner_id),
                    currency_code: Set(input.currency_code.clone()),
                    total_price: Set(Decimal::ZERO),
                    items_count: Set(0),
                    status: Set(cart::CartStatus::Active),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?
            }
        };

        let items = cart.find_related(CartItem).all(&txn).await?;

        // The currency is established by the first line; an itemless cart
        // (only reachable mid-add) re-establishes it.
        let cart = if items.is_empty() && cart.currency_code != input.currency_code {
            let mut active: cart::ActiveModel = cart.into();
            active.currency_code = Set(input.currency_code.clone());
            active.update(&txn).await?
        } else {
            cart
        };

        if !items.is_empty() {
            CurrencyGuard::check(&cart.currency_code, &input.currency_code)?;
        }

        if items
            .iter()
            .any(|line| line.line_item() == input.item)
        {
            return Err(ServiceError::Conflict(format!(
                "{} is already in the cart",
                input.item
            )));
        }

        let quote = self
            .catalog
            .resolve_price(input.item, &input.currency_code)
            .await
            .map_err(|e| map_catalog_error(input.item, e))?;

        let now = Utc::now();
        let new_item = cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart.id),
            item_type: Set(input.item.item_type()),
            item_id: Set(input.item.item_id()),
            quantity: Set(input.quantity),
            unit_price: Set(quote.price),
            currency_code: Set(quote.currency_code),
            title: Set(quote.title),
            thumbnail_url: Set(quote.thumbnail_url),
            creator_id: Set(quote.creator_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // The unique (cart_id, item_type, item_id) index is what actually
        // closes the race between two concurrent adds of the same line.
        if let Err(e) = new_item.insert(&txn).await {
            return Err(match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(format!(
                    "{} is already in the cart",
                    input.item
                )),
                _ => e.into(),
            });
        }

        let (cart, items) = Self::persist_totals(&txn, cart).await?;

        txn.commit().await?;

        if created {
            self.event_sender
                .send_or_log(Event::CartCreated {
                    cart_id: cart.id,
                    owner_id,
                })
                .await;
        }
        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id: cart.id,
                item: input.item,
            })
            .await;

        info!(
            "Added {} x{} to cart {} for owner {}",
            input.item, input.quantity, cart.id, owner_id
        );
        Ok(CartWithItems { cart, items })
    }

    /// Sets the quantity of an existing line. Quantity is the only mutable
    /// field on a line; price and currency stay as snapshotted.
    ///
    /// # Errors
    ///
    /// * `BadRequest` - quantity is not a positive integer
    /// * `NotFound` - the owner has no active cart, or the line does not
    ///   belong to it
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        owner_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartWithItems, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::BadRequest(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let txn = self.begin().await?;

        let cart = Self::active_cart(&txn, owner_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("active cart not found".to_string()))?;
        let item = Self::owned_item(&txn, &cart, item_id).await?;

        let mut item: cart_item::ActiveModel = item.into();
        item.quantity = Set(quantity);
        item.updated_at = Set(Utc::now());
        item.update(&txn).await?;

        let (cart, items) = Self::persist_totals(&txn, cart).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemQuantityChanged {
                cart_id: cart.id,
                item_id,
                quantity,
            })
            .await;

        Ok(CartWithItems { cart, items })
    }

    /// Removes a line. Removing the last line deletes the cart itself, and
    /// the caller gets `None` back - "no active cart" is a valid outcome of
    /// a successful removal, distinct from the `NotFound` a bad target gets.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        owner_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<CartWithItems>, ServiceError> {
        let txn = self.begin().await?;

        let cart = Self::active_cart(&txn, owner_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("active cart not found".to_string()))?;
        let item = Self::owned_item(&txn, &cart, item_id).await?;

        item.delete(&txn).await?;

        let remaining = cart.find_related(CartItem).all(&txn).await?;
        if remaining.is_empty() {
            let cart_id = cart.id;
            cart.delete(&txn).await?;
            txn.commit().await?;

            self.event_sender
                .send_or_log(Event::CartItemRemoved { cart_id, item_id })
                .await;
            self.event_sender
                .send_or_log(Event::CartDeleted { cart_id, owner_id })
                .await;

            info!(
                "Removed last item from cart {}; cart deleted for owner {}",
                cart_id, owner_id
            );
            return Ok(None);
        }

        let (cart, items) = Self::persist_totals(&txn, cart).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved {
                cart_id: cart.id,
                item_id,
            })
            .await;

        Ok(Some(CartWithItems { cart, items }))
    }

    /// Deletes all items and the cart row for the owner's active cart.
    /// Idempotent: clearing with no active cart is a no-op success.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, owner_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.begin().await?;

        let Some(cart) = Self::active_cart(&txn, owner_id).await? else {
            debug!("clear_cart: no active cart for owner {}", owner_id);
            return Ok(());
        };

        let cart_id = cart.id;
        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&txn)
            .await?;
        cart.delete(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartCleared { owner_id })
            .await;
        self.event_sender
            .send_or_log(Event::CartDeleted { cart_id, owner_id })
            .await;

        info!("Cleared cart {} for owner {}", cart_id, owner_id);
        Ok(())
    }

    /// Loads the owner's active cart with its items, outside any
    /// transaction. This is the read path consumed by the presenter; it may
    /// observe a cart mid-mutation by another request.
    pub async fn find_active_cart(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<CartWithItems>, ServiceError> {
        let Some(cart) = Self::active_cart(&*self.db, owner_id).await? else {
            return Ok(None);
        };
        let items = cart.find_related(CartItem).all(&*self.db).await?;
        Ok(Some(CartWithItems { cart, items }))
    }

    async fn begin(&self) -> Result<DatabaseTransaction, ServiceError> {
        // Mutations rely on the isolation level, not code structure, to keep
        // two read-modify-write windows for one owner from interleaving.
        // Backends without the knob (SQLite) are serializable by construction.
        Ok(self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?)
    }

    async fn active_cart(
        conn: &impl ConnectionTrait,
        owner_id: Uuid,
    ) -> Result<Option<cart::Model>, ServiceError> {
        Ok(Cart::find()
            .filter(cart::Column::OwnerId.eq(owner_id))
            .filter(cart::Column::Status.eq(cart::CartStatus::Active))
            .one(conn)
            .await?)
    }

    async fn owned_item(
        conn: &impl ConnectionTrait,
        cart: &cart::Model,
        item_id: Uuid,
    ) -> Result<cart_item::Model, ServiceError> {
        // A line belonging to some other cart is reported exactly like a
        // missing one; item ids are not probeable across owners.
        CartItem::find_by_id(item_id)
            .one(conn)
            .await?
            .filter(|item| item.cart_id == cart.id)
            .ok_or_else(|| ServiceError::NotFound(format!("cart item {} not found", item_id)))
    }

    /// Reloads the full item set and rewrites the derived columns. Always the
    /// final step of a mutation that keeps the cart alive.
    async fn persist_totals(
        conn: &impl ConnectionTrait,
        cart: cart::Model,
    ) -> Result<(cart::Model, Vec<cart_item::Model>), ServiceError> {
        let items = cart.find_related(CartItem).all(conn).await?;
        let totals = totals::recompute(&items);

        let mut active: cart::ActiveModel = cart.into();
        active.total_price = Set(totals.total_price);
        active.items_count = Set(totals.items_count);
        active.updated_at = Set(Utc::now());

        let cart = active.update(conn).await?;
        Ok((cart, items))
    }
}

fn map_catalog_error(item: LineItemRef, err: CatalogError) -> ServiceError {
    match err {
        CatalogError::ItemNotFound => ServiceError::NotFound(format!("{} not found", item)),
        CatalogError::PricingUnavailable { currency } => ServiceError::NotFound(format!(
            "no active {} price for {}",
            currency, item
        )),
        CatalogError::Transport(msg) => ServiceError::ExternalServiceError(msg),
    }
}

/// Input for adding an item to the cart
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemInput {
    pub item: LineItemRef,
    pub currency_code: String,
    pub quantity: i32,
}

/// Cart with items
#[derive(Debug, Serialize)]
pub struct CartWithItems {
    pub cart: cart::Model,
    pub items: Vec<cart_item::Model>,
}
