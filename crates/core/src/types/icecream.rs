//! Ice-cream product records.

use serde::{Deserialize, Serialize};

use super::id::IceCreamId;
use super::validation::{ValidationError, require_amount, require_text};

/// A stored ice-cream product.
///
/// `id` is `None` only before the record has been persisted. The JSON field is
/// `weight`; the legacy `weigth` spelling is still accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCream {
    pub id: Option<IceCreamId>,
    pub name: String,
    pub price: f64,
    #[serde(alias = "weigth")]
    pub weight: f64,
    pub img_url: String,
}

impl IceCream {
    /// Build a stored record from a creation request and its assigned id.
    #[must_use]
    pub fn from_new(id: IceCreamId, new: NewIceCream) -> Self {
        Self {
            id: Some(id),
            name: new.name,
            price: new.price,
            weight: new.weight,
            img_url: new.img_url,
        }
    }
}

/// Payload for creating an ice cream.
///
/// Any `id` sent by the client is ignored; the store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIceCream {
    pub name: String,
    pub price: f64,
    #[serde(alias = "weigth")]
    pub weight: f64,
    pub img_url: String,
}

impl NewIceCream {
    /// Check the required fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name or image URL is blank, or if the
    /// price or weight is negative or not finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_amount("price", self.price)?;
        require_amount("weight", self.weight)?;
        require_text("img_url", &self.img_url)?;
        Ok(())
    }
}

/// Partial update for an ice cream. Only supplied fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IceCreamPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, alias = "weigth", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

impl IceCreamPatch {
    /// Returns true when no field is supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.weight.is_none() && self.img_url.is_none()
    }

    /// Check the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first supplied field that would be
    /// rejected on creation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(price) = self.price {
            require_amount("price", price)?;
        }
        if let Some(weight) = self.weight {
            require_amount("weight", weight)?;
        }
        if let Some(img_url) = &self.img_url {
            require_text("img_url", img_url)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hot_summer() -> NewIceCream {
        NewIceCream {
            name: "Hot Summer".to_string(),
            price: 35.4,
            weight: 50.0,
            img_url: "https://x/y.jpg".to_string(),
        }
    }

    #[test]
    fn test_new_ice_cream_validation() {
        assert!(hot_summer().validate().is_ok());

        let mut negative = hot_summer();
        negative.price = -1.0;
        assert_eq!(
            negative.validate(),
            Err(ValidationError::InvalidAmount { field: "price" })
        );

        let mut unnamed = hot_summer();
        unnamed.name = String::new();
        assert_eq!(
            unnamed.validate(),
            Err(ValidationError::EmptyField { field: "name" })
        );
    }

    #[test]
    fn test_accepts_legacy_weight_spelling() {
        let json = r#"{"name":"Blue Water","price":13.56,"weigth":50.0,"img_url":"u"}"#;
        let new: NewIceCream = serde_json::from_str(json).unwrap();
        assert!((new.weight - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_client_id_is_ignored_on_create() {
        let json = r#"{"id":99,"name":"a","price":1.0,"weight":2.0,"img_url":"u"}"#;
        let new: NewIceCream = serde_json::from_str(json).unwrap();
        let stored = IceCream::from_new(IceCreamId::new(1), new);
        assert_eq!(stored.id, Some(IceCreamId::new(1)));
    }

    #[test]
    fn test_patch_only_supplied_fields() {
        let patch: IceCreamPatch = serde_json::from_str(r#"{"price":12.5}"#).unwrap();
        assert_eq!(patch.price, Some(12.5));
        assert!(patch.name.is_none());
        assert!(patch.weight.is_none());
        assert!(patch.img_url.is_none());
        assert!(!patch.is_empty());
        assert!(IceCreamPatch::default().is_empty());
    }

    #[test]
    fn test_patch_validation() {
        let patch = IceCreamPatch {
            weight: Some(f64::NAN),
            ..IceCreamPatch::default()
        };
        assert_eq!(
            patch.validate(),
            Err(ValidationError::InvalidAmount { field: "weight" })
        );
    }
}
