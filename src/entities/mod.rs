pub mod appointment;
pub mod customer;
pub mod dealer;
pub mod dealer_order;
pub mod dealer_order_item;
pub mod feedback;
pub mod installment_plan;
pub mod installment_schedule;
pub mod invoice;
pub mod order;
pub mod payment;
pub mod quotation;
pub mod refresh_token;
pub mod user;
pub mod vehicle_model;
pub mod vehicle_variant;
