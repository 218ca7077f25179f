//! Image plumbing: uploads record the blob URL on the owning record, and
//! deleting an owner's blobs restores the per-kind placeholder.

#![allow(clippy::unwrap_used)]

use copperleaf_backend::services::images::{
    BRAND_IMAGE_PLACEHOLDER, ImageOwner, PRODUCT_IMAGE_PLACEHOLDER, USER_IMAGE_PLACEHOLDER,
};
use copperleaf_integration_tests::TestContext;

#[tokio::test]
async fn upload_records_url_and_remove_restores_placeholder() {
    let ctx = TestContext::new();
    let user = ctx.user("wanda").await;
    assert_eq!(user.image_url, USER_IMAGE_PLACEHOLDER);

    let url = ctx
        .backend
        .images()
        .upload(
            ImageOwner::User(user.id),
            "avatar.png",
            vec![0x89, 0x50, 0x4e, 0x47],
            "image/png",
        )
        .await
        .unwrap();
    assert!(url.contains("avatar.png"));

    let user = ctx.backend.users().find_by_id(user.id).await.unwrap();
    assert_eq!(user.image_url, url);

    let restored = ctx
        .backend
        .images()
        .remove(ImageOwner::User(user.id))
        .await
        .unwrap();
    assert_eq!(restored, USER_IMAGE_PLACEHOLDER);

    let user = ctx.backend.users().find_by_id(user.id).await.unwrap();
    assert_eq!(user.image_url, USER_IMAGE_PLACEHOLDER);
    assert!(
        ctx.backend
            .images()
            .list(ImageOwner::User(user.id))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn each_kind_gets_its_own_placeholder() {
    let ctx = TestContext::new();
    let brand = ctx.brand("Copperleaf Goods").await;
    let product = ctx.product("Kettle", 1000, 5).await;

    assert_eq!(brand.image_url, BRAND_IMAGE_PLACEHOLDER);
    assert_eq!(product.image_url, PRODUCT_IMAGE_PLACEHOLDER);

    ctx.backend
        .images()
        .upload(ImageOwner::Brand(brand.id), "logo.png", vec![1], "image/png")
        .await
        .unwrap();
    ctx.backend
        .images()
        .upload(
            ImageOwner::Product(product.id),
            "photo.jpg",
            vec![2],
            "image/jpeg",
        )
        .await
        .unwrap();

    assert_eq!(
        ctx.backend
            .images()
            .remove(ImageOwner::Brand(brand.id))
            .await
            .unwrap(),
        BRAND_IMAGE_PLACEHOLDER
    );
    assert_eq!(
        ctx.backend
            .images()
            .remove(ImageOwner::Product(product.id))
            .await
            .unwrap(),
        PRODUCT_IMAGE_PLACEHOLDER
    );
}
