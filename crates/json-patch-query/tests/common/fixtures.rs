//! TM Forum and ELine service documents shared by the scenario suites.

use serde_json::{json, Value};

pub const ORDER_SERVICE_ID: &str = "f36205f4-e144-4ded-9e64-82ede0b26e22";
pub const RELATIONSHIP_SERVICE_ID: &str = "d11e1668-2715-409e-a586-6e0bfa55de9e";
pub const VOICEMAIL_ID: &str = "ed7ce908-9e89-11e8-98d0-529269fb1459";

pub fn trouble_ticket(notes: Value) -> Value {
    json!({"id": "1", "correlationId": "TT53482", "note": notes})
}

pub fn two_notes() -> Value {
    json!([
        {"date": "2013-07-24T09:55:30.0Z", "author": "Arthur Evans"},
        {"date": "2013-07-25T08:55:12.0Z", "author": "John Doe"}
    ])
}

pub fn three_notes() -> Value {
    json!([
        {"date": "2013-07-24T09:55:30.0Z", "author": "Arthur Evans", "text": "Already called the expert"},
        {"date": "2013-07-25T08:55:12.0Z", "author": "John Doe", "text": "Informed"},
        {"date": "2013-07-25T07:55:12.0Z", "author": "Diego Salas", "text": "Resolved issue"}
    ])
}

pub fn regular_price(with_alteration: bool) -> Value {
    let mut price = json!({"name": "Regular Price", "priceType": "recurring"});
    if with_alteration {
        price["prodPriceAlteration"] =
            json!({"name": "Shipping Discount", "description": "This prod price alteration ..."});
    }
    price["price"] = json!({});
    price
}

pub fn setup_price() -> Value {
    json!({"name": "Setup Price", "priceType": "one time", "price": {}})
}

pub fn product(prices: Value) -> Value {
    json!({"id": "4501", "description": "This product ...", "productPrice": prices})
}

pub fn offering(monthly: Value, setup: Value) -> Value {
    json!({
        "id": "42",
        "description": "Virtual Storage Medium",
        "lifecycleStatus": "Active",
        "productOfferingPrice": [
            {"name": "Monthly Price", "priceType": "recurring", "price": monthly},
            {"name": "Setup Price", "priceType": "one time", "price": setup}
        ]
    })
}

pub fn order_item(quantity: u64, parties: Value) -> Value {
    json!({
        "action": "add",
        "quantity": quantity,
        "productOffering": {"href": "/productOffering/1513", "id": "1513", "name": "Offer Good Plan"},
        "product": {"relatedParty": parties}
    })
}

pub fn product_order(items: Value) -> Value {
    json!({
        "id": "3774",
        "description": "This product order covers ...",
        "requestedCompletionDate": "2017-07-14",
        "orderItem": items
    })
}

pub fn eline(characteristics: Value) -> Value {
    json!({
        "id": "e26205f4-e144-4ded-9e64-82ede0b26e33",
        "href": "activationAndConfiguration/v2/service/Eline/e26205f4-e144-4ded-9e64-82ede0b26e33",
        "name": "Eline Service TMF Instance",
        "serviceCharacteristic": characteristics
    })
}

pub fn eline_supporting(services: Value) -> Value {
    json!({
        "id": "e26205f4-e144-4ded-9e64-82ede0b26e33",
        "href": "activationAndConfiguration/v2/service/Eline/e26205f4-e144-4ded-9e64-82ede0b26e33",
        "name": "Eline Service TMF Instance",
        "supportingService": services
    })
}

pub fn data_service() -> Value {
    json!({
        "name": "data",
        "state": "active",
        "serviceSpecification": {
            "name": "data",
            "href": "serviceCatalogManagement/v2/serviceSpecification/data/d29205f4-e144-4ded-9e64-82ede0b26e88"
        }
    })
}

pub fn voicemail_service() -> Value {
    json!({
        "id": VOICEMAIL_ID,
        "href": format!("activationAndConfiguration/v2/service/service2/{VOICEMAIL_ID}"),
        "name": "voicemail",
        "state": "active",
        "serviceSpecification": {
            "name": "voicemail",
            "href": "serviceCatalogManagement/v2/serviceSpecification/voicemail/e29205f4-e144-4ded-9e64-82ede0b99999"
        },
        "serviceCharacteristic": [{"name": "multicastFrameDelivery", "value": "unconditional"}]
    })
}

pub fn voicemail_with(characteristics: Value) -> Value {
    json!({
        "id": VOICEMAIL_ID,
        "href": format!("activationAndConfiguration/v2/service/voicemail/{VOICEMAIL_ID}"),
        "serviceCharacteristic": characteristics
    })
}

pub fn multicast() -> Value {
    json!({"name": "multicastFrameDelivery", "value": "unconditional"})
}

pub fn service_order() -> Value {
    json!({
        "id": "e26205f4-e144-4ded-9e64-82ede0b26e33",
        "href": "serviceOrdering/v4/serviceOrder/internetDirect/e26205f4-e144-4ded-9e64-82ede0b26e33",
        "orderDate": "2020-04-01T14:20:54.1Z",
        "requestedCompletionDate": "2020-10-01T14:20:54.1Z",
        "startDate": "2020-04-01T14:20:54.1Z",
        "state": "inProgress",
        "externalReference": [
            {"externalReferenceType": "SalesOrderId", "name": "ORD1234567"},
            {"externalReferenceType": "FeasibilityId", "name": "ABC1234567"}
        ],
        "relatedParty": [{
            "id": "B2BSmallandMediumBusiness",
            "role": "InstanceConsumerGroup",
            "@referredType": "InstanceConsumerGroup"
        }],
        "serviceOrderItem": [{
            "id": "e26205f4-e144-4ded-9e64-82ede0b26f4",
            "action": "add",
            "state": "inProgress",
            "service": {
                "id": ORDER_SERVICE_ID,
                "href": format!("activationAndConfiguration/v4/service/internetDirect/{ORDER_SERVICE_ID}")
            }
        }]
    })
}

pub fn substitution_relationship() -> Value {
    json!({
        "relationshipType": "substitutionBy",
        "service": {
            "id": RELATIONSHIP_SERVICE_ID,
            "href": format!("activationAndConfiguration/v4/service/ethernetAccessInterface/{RELATIONSHIP_SERVICE_ID}")
        },
        "serviceRelationshipCharacteristic": [{"name": "accessTopology", "value": "Fully Redundant"}]
    })
}

pub fn relies_on_relationship() -> Value {
    json!({
        "relationshipType": "reliesOn",
        "service": {
            "id": RELATIONSHIP_SERVICE_ID,
            "href": format!("activationAndConfiguration/v4/service/ethernetAccess/{RELATIONSHIP_SERVICE_ID}")
        }
    })
}

/// `service_order()` after both relationships were added to its only item.
pub fn service_order_with_relationships() -> Value {
    let mut doc = service_order();
    doc["serviceOrderItem"][0]["service"]["serviceRelationship"] =
        json!([substitution_relationship(), relies_on_relationship()]);
    doc
}
