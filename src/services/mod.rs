// Catalog and master data
pub mod customers;
pub mod dealers;
pub mod vehicles;

// Retail sales flow
pub mod orders;
pub mod quotations;

// Dealer wholesale flow
pub mod dealer_orders;

// Financials
pub mod installments;
pub mod invoicing;
pub mod payments;

// Customer engagement
pub mod appointments;
pub mod feedback;

// File storage
pub mod uploads;
