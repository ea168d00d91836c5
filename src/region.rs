use crate::error::BootstrapError;

const KNOWN_REGIONS: &[&str] = &[
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ca-central-1",
    "cn-north-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-gov-west-1",
    "us-west-1",
    "us-west-2",
];

pub fn known_regions() -> &'static [&'static str] {
    KNOWN_REGIONS
}

/// Returns an error if `region` is not one of the known AWS region codes.
pub fn validate_region(region: &str) -> Result<(), BootstrapError> {
    if KNOWN_REGIONS.contains(&region) {
        Ok(())
    } else {
        Err(BootstrapError::InvalidRegion(region.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_region_accepted() {
        assert!(validate_region("us-east-1").is_ok());
        for region in known_regions() {
            assert!(validate_region(region).is_ok(), "{} rejected", region);
        }
    }

    #[test]
    fn test_unknown_region_rejected() {
        for region in ["mars-central-1", "xx-invalid-1", "US-EAST-1", "", " us-east-1"] {
            match validate_region(region) {
                Err(BootstrapError::InvalidRegion(code)) => assert_eq!(code, region),
                other => panic!("expected InvalidRegion for {:?}, got {:?}", region, other),
            }
        }
    }

    #[test]
    fn test_error_names_region() {
        let err = validate_region("mars-central-1").unwrap_err();
        assert_eq!(err.to_string(), "Not a valid region: mars-central-1");
    }
}
