//! Built-in M.S. Garments FAQ.

use super::rules::RuleTable;

/// Opening message seeded into every new chat session.
pub const GREETING: &str = "Vanakkam! 🙏 Welcome to M.S. Garments. How can I help you today?";

/// Answer when no rule matches. Lists the supported topics and a phone number.
pub const FALLBACK: &str = "I'm sorry, I didn't understand that. You can ask about:\n• Minimum order quantity\n• Delivery & shipping\n• Payment options\n• Products & sizes\n• Pricing & discounts\n• Contact info\n\nOr call us at 96778-05533 for direct assistance!";

pub const MINIMUM_ORDER: &str = "The minimum order quantity is 50 units per product. For bulk orders above 500 units, special discounts are available.";
pub const DELIVERY: &str = "Standard delivery takes 5-7 business days within Tamil Nadu. For other states, delivery takes 7-12 business days. Express delivery is available at additional cost.";
pub const PAYMENT: &str = "We accept UPI, bank transfer (NEFT/RTGS), and cash on delivery for orders within Erode. Payment terms: 50% advance, 50% before dispatch.";
pub const RETURNS: &str = "Returns accepted within 7 days for manufacturing defects only. Products must be unused and in original packaging. No refund on custom orders.";
pub const PRICING: &str = "All our prices are wholesale rates. Prices vary by product type and quantity. Check our product catalog for current pricing. Bulk discounts available for orders above ₹50,000.";
pub const CONTACT: &str = "📞 Call us: 96778-05533 / 86088-85389\n📍 Visit: 24/181, PTS Complex, 1st Floor, Sai Southern (opp) Brinda Street, Erode - 638 001";
pub const PRODUCTS: &str = "We specialize in wholesale garments: Leggins, Pattiyala 4way, Laicra, and Ankle Fit products. All available in multiple colors and sizes.";
pub const SIZES: &str = "We carry sizes from S to 3XL. Free size options also available for leggings and pattiyala. Custom sizing available for bulk orders above 200 units.";
pub const COLORS: &str = "We offer 15+ color options including all popular shades. Custom color matching available for orders above 300 units.";
pub const DISCOUNTS: &str = "Bulk discounts: 5% off on orders above ₹25,000, 10% off above ₹50,000, 15% off above ₹1,00,000. Festival season special offers available.";
pub const WELCOME: &str = "Vanakkam! 🙏 Welcome to M.S. Garments. How can I help you today? You can ask about products, pricing, delivery, or minimum order quantities.";
pub const THANKS: &str = "Thank you for reaching out! 🙏 If you have more questions, feel free to ask. Happy to help!";

/// The default storefront table, in priority order.
///
/// Several keywords are broad (`"min"` also hits "minute", `"time"` hits
/// "sometimes", `"what"` sits under products); earlier entries win.
pub fn default_table() -> RuleTable {
    RuleTable::builder()
        .rule(["minimum", "min", "moq", "order quantity"], MINIMUM_ORDER)
        .rule(["delivery", "shipping", "ship", "deliver", "time"], DELIVERY)
        .rule(["payment", "pay", "upi", "bank"], PAYMENT)
        .rule(["return", "exchange", "refund"], RETURNS)
        .rule(["price", "cost", "rate", "wholesale"], PRICING)
        .rule(["contact", "phone", "call", "number", "reach"], CONTACT)
        .rule(["product", "sell", "available", "stock", "item", "what"], PRODUCTS)
        .rule(["size", "sizes", "measurement"], SIZES)
        .rule(["color", "colour", "colors"], COLORS)
        .rule(["discount", "offer", "deal"], DISCOUNTS)
        .rule(["hello", "hi", "hey", "vanakkam", "good"], WELCOME)
        .rule(["thank", "thanks", "ok", "bye"], THANKS)
        .fallback(FALLBACK)
        .build()
        .expect("built-in FAQ table is valid")
}
