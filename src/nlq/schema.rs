//! SAP Accounts-Receivable graph schema, as described to the language model

/// Node labels with their properties, and the relationships between them.
pub const SCHEMA_DESCRIPTION: &str = "\
The graph contains these nodes and relationships:
- (Company {company_code, company_name})
- (Customer {customer_id, customer_name})
- (Invoice {invoice_id, invoiced_amount, invoiced_date, invoiced_status})
- (Customer_Payment {cust_payment_id, cust_payment_amt, cust_payment_date})
- (FI_Document {fidoc_number, fidoc_fisc_year, fidoc_type})
- (Revenue_GL {revgl_acct, revgl_desc})
- (Bank_GL_Acct {bank_gl_acct, bank_name})
- (Dunning {dunning_id, dunning_level, dunning_date})
- (Sales_Order {sales_ord_id, sales_ord_date, sales_ord_amt, sales_ord_status})
- (Delivery {delivery_id, delivery_date, delivery_status})

- Relationships include:
  - (Customer)-[:BELONGS_TO]->(Company)
  - (Invoice)-[:ISSUED_TO]->(Customer)
  - (Invoice)-[:POSTED_AS]->(FI_Document)
  - (Customer_Payment)<-[:MADE_PAYMENT]-(Customer)
  - (FI_Document)-[:USES_ACCOUNT]->(Revenue_GL)
  - (Customer_Payment)-[:CLEARS]->(Invoice)
  - (Sales_Order)-[:CREATED_FOR]->(Customer)
  - (Delivery)-[:FULFILLS]->(Sales_Order)
  - (Invoice)-[:BILLED_FOR]->(Delivery)
";

/// Node labels present in [`SCHEMA_DESCRIPTION`]
pub const NODE_LABELS: [&str; 10] = [
    "Company",
    "Customer",
    "Invoice",
    "Customer_Payment",
    "FI_Document",
    "Revenue_GL",
    "Bank_GL_Acct",
    "Dunning",
    "Sales_Order",
    "Delivery",
];

/// Questions offered to users as a starting point
pub const EXAMPLE_QUESTIONS: [&str; 4] = [
    "Show all unpaid invoices by customer for 2023",
    "Total invoiced amount for company code 1000",
    "Invoices linked to FI document type DR",
    "Payments received in April 2024 by company 2000",
];

/// Build the fixed system instruction sent with every translation request.
pub fn system_prompt() -> String {
    format!(
        "You are a Cypher expert for a Neo4j database containing SAP Accounts Receivable data.\n\n\
         {}\n\
         Generate a Cypher query to answer the user's prompt.\n\
         Return only the Cypher query (no explanation, no code formatting).",
        SCHEMA_DESCRIPTION
    )
}
