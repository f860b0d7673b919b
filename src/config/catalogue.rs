//! Back-office entity catalogue. Adding an entity here is all it takes to expose and migrate it.

use crate::config::types::FieldType::{Boolean, Date, DateTime, Float, Integer, Text};
use crate::config::types::{optional, required, EntityDescriptor, FieldDescriptor, Ownership, OWNER_COLUMN};

const OWNED: Ownership = Ownership::Owned {
    column: OWNER_COLUMN,
};
const OWNER: FieldDescriptor = required(OWNER_COLUMN, Text);

pub static CATALOGUE: &[EntityDescriptor] = &[
    EntityDescriptor {
        name: "accounts",
        ownership: Ownership::Shared,
        fields: &[
            required("name", Text),
            required("account_type", Text),
            required("balance", Float),
        ],
    },
    EntityDescriptor {
        name: "ai_alerts",
        ownership: Ownership::Shared,
        fields: &[
            required("alert_date", DateTime),
            required("alert_type", Text),
            required("message", Text),
            required("risk_score", Integer),
        ],
    },
    EntityDescriptor {
        name: "audit_logs",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("action", Text),
            required("entity_type", Text),
            optional("entity_id", Integer),
            optional("details", Text),
            optional("ip_address", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "cash_flow_predictions",
        ownership: Ownership::Shared,
        fields: &[
            required("prediction_date", Date),
            required("predicted_balance", Float),
        ],
    },
    EntityDescriptor {
        name: "customers",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("customer_code", Text),
            required("name", Text),
            optional("email", Text),
            optional("phone", Text),
            optional("address", Text),
            optional("loyalty_points", Integer),
            optional("total_purchases", Float),
            optional("last_purchase_date", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "daily_summaries",
        ownership: Ownership::Shared,
        fields: &[
            required("summary_date", Date),
            required("total_sales", Float),
            required("total_expenses", Float),
            required("profit", Float),
            required("cash_balance", Float),
        ],
    },
    EntityDescriptor {
        name: "employees",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("employee_code", Text),
            required("name", Text),
            optional("email", Text),
            optional("phone", Text),
            required("role", Text),
            optional("department", Text),
            optional("hire_date", Text),
            optional("salary", Float),
            optional("status", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "journal_details",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("entry_id", Integer),
            required("account_id", Integer),
            required("account_name", Text),
            required("debit", Float),
            required("credit", Float),
        ],
    },
    EntityDescriptor {
        name: "journal_entries",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("entry_date", Date),
            required("description", Text),
            required("created_by", Text),
        ],
    },
    EntityDescriptor {
        name: "locations",
        ownership: Ownership::Shared,
        fields: &[
            required("location_code", Text),
            required("name", Text),
            optional("address", Text),
            optional("phone", Text),
            optional("manager_name", Text),
            optional("is_active", Boolean),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "notifications",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("title", Text),
            required("message", Text),
            required("type", Text),
            optional("is_read", Boolean),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "payment_methods",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("name", Text),
            required("type", Text),
            optional("is_active", Boolean),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "products",
        ownership: Ownership::Shared,
        fields: &[
            required("name", Text),
            required("category", Text),
            required("quantity", Integer),
            required("cost_price", Float),
            required("sell_price", Float),
            required("low_stock_threshold", Integer),
        ],
    },
    EntityDescriptor {
        name: "profit_predictions",
        ownership: Ownership::Shared,
        fields: &[
            required("prediction_date", Date),
            required("predicted_profit", Float),
            required("confidence", Float),
        ],
    },
    EntityDescriptor {
        name: "purchase_order_items",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("po_id", Integer),
            required("product_id", Integer),
            optional("product_name", Text),
            required("quantity", Integer),
            required("unit_price", Float),
            optional("total_price", Float),
            optional("received_quantity", Integer),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "purchase_orders",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("po_number", Text),
            required("supplier_id", Integer),
            optional("supplier_name", Text),
            required("order_date", Text),
            optional("expected_delivery", Text),
            required("total_amount", Float),
            optional("status", Text),
            optional("created_by", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "receipts",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("receipt_number", Text),
            required("sale_id", Integer),
            optional("customer_id", Integer),
            required("total_amount", Float),
            optional("payment_method", Text),
            optional("cashier_name", Text),
            required("receipt_date", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "return_items",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("return_id", Integer),
            required("product_id", Integer),
            optional("product_name", Text),
            required("quantity", Integer),
            required("price", Float),
            optional("total_price", Float),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "returns",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("return_number", Text),
            required("sale_id", Integer),
            optional("customer_id", Integer),
            required("return_amount", Float),
            optional("reason", Text),
            optional("processed_by", Text),
            required("return_date", Text),
            optional("status", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "sale_items",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("sale_id", Integer),
            required("product_id", Integer),
            required("product_name", Text),
            required("quantity", Integer),
            required("price", Float),
        ],
    },
    EntityDescriptor {
        name: "sales",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("sale_date", DateTime),
            required("total_amount", Float),
            required("cashier_name", Text),
        ],
    },
    EntityDescriptor {
        name: "sales_forecasts",
        ownership: Ownership::Shared,
        fields: &[
            required("forecast_date", Date),
            required("predicted_value", Float),
            required("confidence", Float),
        ],
    },
    EntityDescriptor {
        name: "shifts",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("employee_id", Integer),
            optional("employee_name", Text),
            required("shift_date", Text),
            required("start_time", Text),
            required("end_time", Text),
            optional("clock_in", Text),
            optional("clock_out", Text),
            optional("status", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "stock_adjustments",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("product_id", Integer),
            optional("product_name", Text),
            required("adjustment_type", Text),
            required("quantity", Integer),
            optional("reason", Text),
            optional("adjusted_by", Text),
            required("adjustment_date", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "suppliers",
        ownership: OWNED,
        fields: &[
            OWNER,
            required("supplier_code", Text),
            required("name", Text),
            optional("contact_person", Text),
            optional("email", Text),
            optional("phone", Text),
            optional("address", Text),
            optional("payment_terms", Text),
            optional("status", Text),
            optional("created_at", Text),
        ],
    },
    EntityDescriptor {
        name: "tax_rates",
        ownership: Ownership::Shared,
        fields: &[
            required("name", Text),
            required("rate", Float),
            optional("description", Text),
            optional("is_active", Boolean),
            optional("created_at", Text),
        ],
    },
];
